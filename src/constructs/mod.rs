// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application Constructs
//!
//! Each builder is a pure function `(scope, id, config) -> Result<Output>`
//! that opens a child scope named `id`, validates and defaults its input in a
//! single resolve step, then registers its declarations in a fixed order:
//!
//! ```text
//! security boundary → supporting groups → primary resource → derived policies/secrets
//! ```
//!
//! - [`load_balancer`] - application load balancer with optional access logs
//! - [`rds_cluster`] - private relational cluster plus connection secret
//! - [`dynamodb_table`] - key-value table with target-tracking autoscaling

pub mod autoscaling;
pub mod dynamodb_table;
pub mod load_balancer;
pub mod rds_cluster;

pub use autoscaling::{AutoscalingRole, ScalingPolicy};
pub use dynamodb_table::{
    build_dynamodb_table, AttributeDefinition, DynamoTable, DynamoTableConfig, SecondaryIndex,
    TableConfig,
};
pub use load_balancer::{
    build_load_balancer, AccessLogsConfig, BucketConfig, LoadBalancer, LoadBalancerConfig,
};
pub use rds_cluster::{build_rds_cluster, ClusterConfig, RdsCluster, RdsClusterConfig, SecretPayload};

use serde_json::{json, Map, Value};

use crate::errors::ConstructResult;
use crate::graph::NodeConfig;

/// IPv4 "anywhere"
pub(crate) const ANY_IPV4: &str = "0.0.0.0/0";

/// IPv6 "anywhere"
pub(crate) const ANY_IPV6: &str = "::/0";

/// Merge caller pass-through attributes with the ones the construct controls
///
/// Controlled attributes win; the caller cannot override what the construct
/// wires itself.
pub(crate) fn merged_attributes(
    extra: &Map<String, Value>,
    controlled: Value,
) -> ConstructResult<NodeConfig> {
    let mut attributes = extra.clone();
    if let Value::Object(controlled) = controlled {
        attributes.extend(controlled);
    }
    NodeConfig::from_json(Value::Object(attributes))
}

/// Inline security group rule in provider block form
pub(crate) fn sg_rule(
    description: &str,
    from_port: u16,
    to_port: u16,
    protocol: &str,
    cidr_blocks: &[&str],
    ipv6_cidr_blocks: &[&str],
) -> Value {
    json!({
        "description": description,
        "from_port": from_port,
        "to_port": to_port,
        "protocol": protocol,
        "cidr_blocks": cidr_blocks,
        "ipv6_cidr_blocks": ipv6_cidr_blocks,
        "prefix_list_ids": [],
        "security_groups": [],
        "self": false,
    })
}

/// Unrestricted egress rule
pub(crate) fn allow_all_egress() -> Value {
    sg_rule("Allow all outbound", 0, 0, "-1", &[ANY_IPV4], &[ANY_IPV6])
}
