// Copyright (c) 2025 - Cowboy AI, Inc.
//! Table Capacity Value Objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::invariants::{validate_capacity, ValidationError};

/// Throughput dimension of a table or index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityType {
    /// Read capacity units
    Read,
    /// Write capacity units
    Write,
}

impl CapacityType {
    /// Both dimensions, read first
    pub const ALL: [CapacityType; 2] = [CapacityType::Read, CapacityType::Write];

    /// Name used in derived declaration ids
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    /// Predefined target-tracking metric for this dimension
    pub fn predefined_metric(&self) -> &'static str {
        match self {
            Self::Read => "DynamoDBReadCapacityUtilization",
            Self::Write => "DynamoDBWriteCapacityUtilization",
        }
    }

    /// Scalable dimension of the table itself
    pub fn table_dimension(&self) -> &'static str {
        match self {
            Self::Read => "dynamodb:table:ReadCapacityUnits",
            Self::Write => "dynamodb:table:WriteCapacityUnits",
        }
    }

    /// Scalable dimension of a secondary index
    pub fn index_dimension(&self) -> &'static str {
        match self {
            Self::Read => "dynamodb:index:ReadCapacityUnits",
            Self::Write => "dynamodb:index:WriteCapacityUnits",
        }
    }
}

impl fmt::Display for CapacityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing model of a table
///
/// Serialized with the caller-facing names; [`CapacityMode::billing_mode`]
/// gives the value the provider expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityMode {
    /// Fixed capacity, optionally autoscaled
    #[default]
    #[serde(rename = "PROVISIONED")]
    Provisioned,
    /// Pay per request, never autoscaled
    #[serde(rename = "ON_DEMAND")]
    OnDemand,
}

impl CapacityMode {
    /// Caller-facing name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioned => "PROVISIONED",
            Self::OnDemand => "ON_DEMAND",
        }
    }

    /// Provider `billing_mode` value
    pub fn billing_mode(&self) -> &'static str {
        match self {
            Self::Provisioned => "PROVISIONED",
            Self::OnDemand => "PAY_PER_REQUEST",
        }
    }
}

impl fmt::Display for CapacityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapacityMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROVISIONED" => Ok(Self::Provisioned),
            "ON_DEMAND" | "PAY_PER_REQUEST" => Ok(Self::OnDemand),
            other => Err(ValidationError::InvalidCapacityMode(other.to_string())),
        }
    }
}

/// Target tracking configuration for one capacity dimension
///
/// Invariants:
/// - `min <= max`
/// - `tracking` is a utilization percentage in `(0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacitySpec {
    /// Target utilization percentage
    pub tracking: f64,
    /// Upper scaling bound
    pub max: u32,
    /// Lower scaling bound
    pub min: u32,
}

impl CapacitySpec {
    /// Create a validated capacity spec
    pub fn new(tracking: f64, max: u32, min: u32) -> Result<Self, ValidationError> {
        let spec = Self { tracking, max, min };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the invariants; deserialized specs skip [`CapacitySpec::new`]
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_capacity(self)
    }
}
