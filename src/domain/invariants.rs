// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Construct Invariants
//!
//! Every configuration rule the builders enforce lives here. All functions are
//! pure (no side effects) and return detailed validation results, so a builder
//! can reject its input before registering a single declaration.
//!
//! # Invariant Categories
//!
//! 1. **Structural Invariants**: required fields are present and non-empty
//! 2. **Range Invariants**: capacity bounds and tracking percentages
//! 3. **Exclusivity Invariants**: exactly-one-of choices (log bucket, capacity mode)
//! 4. **Format Invariants**: log prefixes, stream view types

use super::capacity::{CapacityMode, CapacitySpec};
use super::stream::StreamViewType;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Required field missing or empty
    #[error("Field '{0}' is required and must not be empty")]
    MissingField(&'static str),

    /// Streaming enabled without a view type
    #[error("stream_view_type is required when stream_enabled is true (expected one of KEYS_ONLY, NEW_IMAGE, OLD_IMAGE, NEW_AND_OLD_IMAGES)")]
    MissingStreamViewType,

    /// View type outside the accepted set
    #[error("Invalid stream_view_type {0:?} (expected one of KEYS_ONLY, NEW_IMAGE, OLD_IMAGE, NEW_AND_OLD_IMAGES)")]
    InvalidStreamViewType(String),

    /// Unknown capacity mode
    #[error("Invalid capacity mode {0:?} (expected PROVISIONED or ON_DEMAND)")]
    InvalidCapacityMode(String),

    /// Tracking target is not a percentage in (0, 100]
    #[error("Capacity tracking target {0} must be in (0, 100]")]
    TrackingOutOfRange(f64),

    /// Lower bound above upper bound
    #[error("Capacity min {min} exceeds max {max}")]
    CapacityBoundsInverted { min: u32, max: u32 },

    /// Autoscaling requested on a pay-per-request table
    #[error("Capacity specs cannot be combined with capacity mode ON_DEMAND")]
    OnDemandWithCapacity,

    /// Access-log prefix starts or ends with `/`
    #[error("Access log prefix {0:?} must not start or end with '/'")]
    LogPrefixSeparator(String),

    /// Access logs configured with both bucket choices
    #[error("Access logs accept either existing_bucket or bucket, not both")]
    AmbiguousLogBucket,

    /// Access logs configured without a bucket
    #[error("Access logs require either existing_bucket or bucket")]
    MissingLogBucket,
}

/// Validate a required string field
pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Validate change-stream settings and resolve the view type
///
/// # Rules
/// - Streaming disabled: no view type is declared, whatever the input says
/// - Streaming enabled: the view type must be present and one of the four
///   accepted values
pub fn validate_stream(
    enabled: bool,
    view_type: Option<&str>,
) -> Result<Option<StreamViewType>, ValidationError> {
    if !enabled {
        return Ok(None);
    }
    match view_type {
        Some(view) => view.parse().map(Some),
        None => Err(ValidationError::MissingStreamViewType),
    }
}

/// Validate one capacity spec
///
/// # Rules
/// - `tracking` in `(0, 100]`
/// - `min <= max`
pub fn validate_capacity(spec: &CapacitySpec) -> ValidationResult {
    if !(spec.tracking > 0.0 && spec.tracking <= 100.0) {
        return Err(ValidationError::TrackingOutOfRange(spec.tracking));
    }
    if spec.min > spec.max {
        return Err(ValidationError::CapacityBoundsInverted {
            min: spec.min,
            max: spec.max,
        });
    }
    Ok(())
}

/// Validate that autoscaling is only requested for provisioned tables
pub fn validate_capacity_mode(mode: CapacityMode, has_capacity_specs: bool) -> ValidationResult {
    if mode == CapacityMode::OnDemand && has_capacity_specs {
        return Err(ValidationError::OnDemandWithCapacity);
    }
    Ok(())
}

/// Validate an access-log path prefix
///
/// # Rules
/// - Must not start with `/`
/// - Must not end with `/`
pub fn validate_log_prefix(prefix: &str) -> ValidationResult {
    if prefix.starts_with('/') || prefix.ends_with('/') {
        return Err(ValidationError::LogPrefixSeparator(prefix.to_string()));
    }
    Ok(())
}

/// Validate that exactly one access-log bucket choice is set
pub fn validate_bucket_choice(has_existing: bool, has_new: bool) -> ValidationResult {
    match (has_existing, has_new) {
        (true, true) => Err(ValidationError::AmbiguousLogBucket),
        (false, false) => Err(ValidationError::MissingLogBucket),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_stream_enabled() {
        assert_eq!(
            validate_stream(true, Some("NEW_IMAGE")),
            Ok(Some(StreamViewType::NewImage))
        );
        assert_eq!(
            validate_stream(true, None),
            Err(ValidationError::MissingStreamViewType)
        );
        assert!(matches!(
            validate_stream(true, Some("EVERYTHING")),
            Err(ValidationError::InvalidStreamViewType(_))
        ));
    }

    #[test]
    fn test_validate_stream_disabled() {
        assert_eq!(validate_stream(false, None), Ok(None));
        assert_eq!(validate_stream(false, Some("KEYS_ONLY")), Ok(None));
        assert_eq!(validate_stream(false, Some("bogus")), Ok(None));
    }

    #[test]
    fn test_validate_log_prefix() {
        assert!(validate_log_prefix("logs/path").is_ok());
        assert!(validate_log_prefix("server-logs/orders/alb").is_ok());
        assert!(validate_log_prefix("/logs/").is_err());
        assert!(validate_log_prefix("/logs").is_err());
        assert!(validate_log_prefix("logs/").is_err());
    }

    #[test]
    fn test_validate_bucket_choice() {
        assert!(validate_bucket_choice(true, false).is_ok());
        assert!(validate_bucket_choice(false, true).is_ok());
        assert_eq!(
            validate_bucket_choice(true, true),
            Err(ValidationError::AmbiguousLogBucket)
        );
        assert_eq!(
            validate_bucket_choice(false, false),
            Err(ValidationError::MissingLogBucket)
        );
    }

    #[test]
    fn test_validate_capacity_mode() {
        assert!(validate_capacity_mode(CapacityMode::Provisioned, true).is_ok());
        assert!(validate_capacity_mode(CapacityMode::OnDemand, false).is_ok());
        assert_eq!(
            validate_capacity_mode(CapacityMode::OnDemand, true),
            Err(ValidationError::OnDemandWithCapacity)
        );
    }

    #[test]
    fn test_validate_capacity_nan_tracking() {
        let spec = CapacitySpec {
            tracking: f64::NAN,
            max: 10,
            min: 1,
        };
        assert!(matches!(
            validate_capacity(&spec),
            Err(ValidationError::TrackingOutOfRange(_))
        ));
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "orders").is_ok());
        assert_eq!(
            validate_required("name", "  "),
            Err(ValidationError::MissingField("name"))
        );
    }
}
