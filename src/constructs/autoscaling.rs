// Copyright (c) 2025 - Cowboy AI, Inc.
//! Table Autoscaling
//!
//! Target-tracking autoscaling for a provisioned table and its secondary
//! indexes, one capacity dimension at a time. Each dimension gets its own
//! IAM role, a scalable target plus scaling policy for the table, and one
//! target/policy pair per secondary index.
//!
//! Index targets take their minimum from the index's own declared capacity;
//! maximum and tracking target come from the table-level spec. Per-index
//! maximum and tracking are not configurable.

use serde_json::json;
use tracing::{debug, warn};

use crate::constructs::dynamodb_table::SecondaryIndex;
use crate::domain::{
    with_name_tag, CapacitySpec, CapacityType, PolicyDocument, Principal, Statement, Tags,
};
use crate::errors::{ConstructError, ConstructResult};
use crate::graph::{NodeConfig, NodeRef, Scope};

/// Service principal of application autoscaling
pub const AUTOSCALING_PRINCIPAL: &str = "application-autoscaling.amazonaws.com";

/// Service namespace of table scalable targets
pub const DYNAMODB_NAMESPACE: &str = "dynamodb";

/// Role and policy letting autoscaling adjust one table
#[derive(Debug, Clone, PartialEq)]
pub struct AutoscalingRole {
    pub role: NodeRef,
    pub policy: NodeRef,
}

impl AutoscalingRole {
    /// Role ARN token
    pub fn arn(&self) -> String {
        self.role.arn()
    }
}

/// Scalable target and its target-tracking policy
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingPolicy {
    pub capacity: CapacityType,
    /// `table/<name>` or `table/<name>/index/<index>`
    pub resource_id: String,
    pub target: NodeRef,
    pub policy: NodeRef,
}

/// Where a scalable target points
struct ScalableResource<'a> {
    resource_id: String,
    dimension: &'static str,
    name: String,
    min: u32,
    spec: &'a CapacitySpec,
}

/// Declare the IAM policy and role used by one capacity dimension
///
/// The platform may swap this role for its account-wide service-linked
/// autoscaling role at apply time; it is declared regardless.
pub fn create_autoscaling_role(
    scope: &mut Scope<'_>,
    prefix: &str,
    table: &NodeRef,
    capacity: CapacityType,
    tags: &Tags,
) -> ConstructResult<AutoscalingRole> {
    // IAM names are account-wide
    let name = format!("{}-{}-{}-autoscaling", prefix, table.unique_id(), capacity);

    let permissions = PolicyDocument::new(vec![
        Statement::allow(
            [
                "application-autoscaling:*",
                "cloudwatch:DescribeAlarms",
                "cloudwatch:PutMetricAlarm",
            ],
            ["*"],
        ),
        Statement::allow(
            ["dynamodb:DescribeTable", "dynamodb:UpdateTable"],
            [table.arn(), format!("{}/*", table.arn())],
        ),
    ]);

    let policy = scope.resource(
        &format!("{}-autoscaling-policy", capacity),
        "aws_iam_policy",
        NodeConfig::from_json(json!({
            "name": name,
            "description": format!("Lets application autoscaling manage {} capacity", capacity),
            "policy": permissions.to_json()?,
            "tags": with_name_tag(tags, name.as_str()),
        }))?
        .depends_on(table),
    )?;

    let trust = PolicyDocument::new(vec![Statement::allow(
        ["sts:AssumeRole"],
        Vec::<String>::new(),
    )
    .with_principal(Principal::Service(AUTOSCALING_PRINCIPAL.to_string()))]);

    let role = scope.resource(
        &format!("{}-autoscaling-role", capacity),
        "aws_iam_role",
        NodeConfig::from_json(json!({
            "name": name,
            "assume_role_policy": trust.to_json()?,
            "managed_policy_arns": [policy.arn()],
            "tags": with_name_tag(tags, name.as_str()),
        }))?
        .depends_on(&policy),
    )?;

    debug!(
        capacity = %capacity,
        role = %role,
        "Declared autoscaling role; the platform may replace it with its service-linked role"
    );

    Ok(AutoscalingRole { role, policy })
}

/// Declare the table-level target and policy for one dimension
///
/// Named `<table unique id>_<capacity>_table` so that several tables in the
/// same tree never collide.
pub fn create_table_policy(
    scope: &mut Scope<'_>,
    table: &NodeRef,
    table_name: &str,
    capacity: CapacityType,
    spec: &CapacitySpec,
    role: &AutoscalingRole,
) -> ConstructResult<ScalingPolicy> {
    declare_scaling(
        scope,
        table,
        capacity,
        role,
        ScalableResource {
            resource_id: format!("table/{}", table_name),
            dimension: capacity.table_dimension(),
            name: format!("{}_{}_table", table.unique_id(), capacity),
            min: spec.min,
            spec,
        },
    )
}

/// Declare a target and policy per secondary index for one dimension
///
/// Fails with [`ConstructError::MissingIndexName`] when an index has no name.
pub fn create_index_policies(
    scope: &mut Scope<'_>,
    table: &NodeRef,
    table_name: &str,
    indexes: &[SecondaryIndex],
    capacity: CapacityType,
    spec: &CapacitySpec,
    role: &AutoscalingRole,
) -> ConstructResult<Vec<ScalingPolicy>> {
    let mut policies = Vec::with_capacity(indexes.len());

    for (position, index) in indexes.iter().enumerate() {
        let index_name = index_name(table_name, position, index)?;

        let min = index.capacity(capacity).unwrap_or(spec.min);
        if min > spec.max {
            warn!(
                index = index_name,
                capacity = %capacity,
                min,
                max = spec.max,
                "Index capacity exceeds the table-level autoscaling maximum"
            );
        }

        policies.push(declare_scaling(
            scope,
            table,
            capacity,
            role,
            ScalableResource {
                resource_id: format!("table/{}/index/{}", table_name, index_name),
                dimension: capacity.index_dimension(),
                name: format!("{}_{}_index", index_name, capacity),
                min,
                spec,
            },
        )?);
    }

    Ok(policies)
}

/// Name of the index at `position`, required to address its scalable target
pub fn index_name<'a>(
    table_name: &str,
    position: usize,
    index: &'a SecondaryIndex,
) -> ConstructResult<&'a str> {
    index
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ConstructError::MissingIndexName {
            table: table_name.to_string(),
            position,
        })
}

fn declare_scaling(
    scope: &mut Scope<'_>,
    table: &NodeRef,
    capacity: CapacityType,
    role: &AutoscalingRole,
    resource: ScalableResource<'_>,
) -> ConstructResult<ScalingPolicy> {
    let target = scope.resource(
        &format!("{}-target", resource.name),
        "aws_appautoscaling_target",
        NodeConfig::from_json(json!({
            "max_capacity": resource.spec.max,
            "min_capacity": resource.min,
            "resource_id": resource.resource_id,
            "role_arn": role.arn(),
            "scalable_dimension": resource.dimension,
            "service_namespace": DYNAMODB_NAMESPACE,
        }))?
        .depends_on(table)
        .depends_on(&role.role),
    )?;

    let policy = scope.resource(
        &format!("{}-policy", resource.name),
        "aws_appautoscaling_policy",
        NodeConfig::from_json(json!({
            "name": resource.name,
            "policy_type": "TargetTrackingScaling",
            "resource_id": target.attr("resource_id"),
            "scalable_dimension": target.attr("scalable_dimension"),
            "service_namespace": target.attr("service_namespace"),
            "target_tracking_scaling_policy_configuration": {
                "predefined_metric_specification": {
                    "predefined_metric_type": capacity.predefined_metric(),
                },
                "target_value": resource.spec.tracking,
            },
        }))?
        .depends_on(&target),
    )?;

    Ok(ScalingPolicy {
        capacity,
        resource_id: resource.resource_id,
        target,
        policy,
    })
}
