// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Construct Builders
//!
//! These tests prove that validation accepts exactly the configurations it
//! should and that autoscaling fan-out scales with the number of indexes.

use cim_constructs::{
    build_dynamodb_table, build_load_balancer, AccessLogsConfig, CapacitySpec, ConstructError,
    Stack, StreamViewType, ValidationError,
};
use proptest::prelude::*;

use crate::fixtures::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Prefixes with no separator at either edge
fn valid_prefix() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,12}(/[a-z0-9-]{1,12}){0,3}"
}

/// Valid prefix with a separator glued to one or both edges
fn invalid_prefix() -> impl Strategy<Value = String> {
    (valid_prefix(), 0..3usize).prop_map(|(prefix, edge)| match edge {
        0 => format!("/{}", prefix),
        1 => format!("{}/", prefix),
        _ => format!("/{}/", prefix),
    })
}

/// Strings that are not one of the four view types
fn invalid_view_type() -> impl Strategy<Value = String> {
    "[A-Za-z_]{0,20}".prop_filter("must not be a valid view type", |view| {
        view.parse::<StreamViewType>().is_err()
    })
}

fn any_capacity() -> impl Strategy<Value = CapacitySpec> {
    (-10.0f64..120.0, 0u32..50, 0u32..50).prop_map(|(tracking, max, min)| CapacitySpec {
        tracking,
        max,
        min,
    })
}

fn logs_with_prefix(prefix: String) -> AccessLogsConfig {
    AccessLogsConfig {
        existing_bucket: Some("shared-access-logs".into()),
        prefix: Some(prefix),
        ..Default::default()
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: prefixes without edge separators are always accepted
    #[test]
    fn prop_valid_log_prefix_accepted(prefix in valid_prefix()) {
        let mut config = load_balancer_config();
        config.access_logs = Some(logs_with_prefix(prefix));

        let mut stack = Stack::new("prop");
        prop_assert!(build_load_balancer(&mut stack.root(), "web", &config).is_ok());
    }

    /// Property: a separator at either edge always fails construction
    #[test]
    fn prop_edge_separator_rejected(prefix in invalid_prefix()) {
        let mut config = load_balancer_config();
        config.access_logs = Some(logs_with_prefix(prefix));

        let mut stack = Stack::new("prop");
        let result = build_load_balancer(&mut stack.root(), "web", &config);
        prop_assert!(matches!(
            result,
            Err(ConstructError::Validation(ValidationError::LogPrefixSeparator(_)))
        ));
        prop_assert!(stack.is_empty());
    }

    /// Property: streaming with anything but the four view types fails
    #[test]
    fn prop_invalid_view_type_rejected(view in invalid_view_type()) {
        let mut config = table_config();
        config.table.stream_enabled = true;
        config.table.stream_view_type = Some(view);

        let mut stack = Stack::new("prop");
        let result = build_dynamodb_table(&mut stack.root(), "orders", &config);
        prop_assert!(matches!(
            result,
            Err(ConstructError::Validation(ValidationError::InvalidStreamViewType(_)))
        ));
        prop_assert!(stack.is_empty());
    }

    /// Property: capacity specs are accepted iff min <= max and 0 < tracking <= 100
    #[test]
    fn prop_capacity_invariant(spec in any_capacity()) {
        let mut config = table_config();
        config.read_capacity = Some(spec);

        let expected_ok = spec.min <= spec.max && spec.tracking > 0.0 && spec.tracking <= 100.0;
        let mut stack = Stack::new("prop");
        let result = build_dynamodb_table(&mut stack.root(), "orders", &config);
        prop_assert_eq!(result.is_ok(), expected_ok);
    }

    /// Property: each autoscaled dimension yields one table target plus one per index
    #[test]
    fn prop_fan_out_scales_with_indexes(
        index_count in 0usize..6,
        read in any::<bool>(),
        write in any::<bool>(),
    ) {
        let mut config = table_config();
        config.table.global_secondary_index = (0..index_count)
            .map(|i| secondary_index(&format!("gsi-{}", i), "customer", 1, 1))
            .collect();
        config.read_capacity = read.then(|| capacity(70.0, 10, 1));
        config.write_capacity = write.then(|| capacity(50.0, 20, 1));

        let mut stack = Stack::new("prop");
        let table = build_dynamodb_table(&mut stack.root(), "orders", &config).unwrap();

        let dimensions = usize::from(read) + usize::from(write);
        let expected = dimensions * (1 + index_count);
        prop_assert_eq!(stack.find("aws_appautoscaling_target").len(), expected);
        prop_assert_eq!(stack.find("aws_appautoscaling_policy").len(), expected);
        prop_assert_eq!(stack.find("aws_iam_role").len(), dimensions);
        prop_assert_eq!(table.scaling_policies.len(), expected);
    }
}
