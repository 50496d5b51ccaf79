// Copyright (c) 2025 - Cowboy AI, Inc.
//! Keyed Table Construct
//!
//! Declares a key-value table and, for every capacity dimension with a
//! [`CapacitySpec`], the autoscaling wiring for the table and each of its
//! secondary indexes (see [`super::autoscaling`]).
//!
//! # Invariants
//! - Streaming enabled requires a valid stream view type
//! - Capacity specs satisfy `min <= max` and `0 < tracking <= 100`
//! - On-demand tables receive no capacity specs
//!
//! # Lifecycle
//! - Destroy protection unless `prevent_destroy_table` is `false`
//! - `read_capacity`/`write_capacity` drift is ignored; autoscaling owns them

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use super::autoscaling::{
    create_autoscaling_role, create_index_policies, create_table_policy, index_name,
    AutoscalingRole, ScalingPolicy,
};
use super::merged_attributes;
use crate::domain::invariants::{validate_capacity_mode, validate_required, validate_stream};
use crate::domain::{CapacityMode, CapacitySpec, CapacityType, StreamViewType, Tags};
use crate::errors::ConstructResult;
use crate::graph::{Lifecycle, NodeRef, Scope};

/// Key attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    /// `S`, `N` or `B`
    #[serde(rename = "type")]
    pub attribute_type: String,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: attribute_type.into(),
        }
    }
}

/// Global secondary index block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryIndex {
    /// Required by the provider; kept optional so a missing name surfaces as
    /// a construction error instead of a deserialization one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Initial read capacity, also the autoscaling minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_capacity: Option<u32>,

    /// Initial write capacity, also the autoscaling minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_capacity: Option<u32>,

    /// `hash_key`, `projection_type`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SecondaryIndex {
    /// Declared capacity for a dimension
    pub fn capacity(&self, capacity: CapacityType) -> Option<u32> {
        match capacity {
            CapacityType::Read => self.read_capacity,
            CapacityType::Write => self.write_capacity,
        }
    }
}

/// Table attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,

    pub hash_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,

    #[serde(default)]
    pub attribute: Vec<AttributeDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_index: Vec<SecondaryIndex>,

    #[serde(default)]
    pub stream_enabled: bool,

    /// Parsed into [`StreamViewType`] during resolve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_view_type: Option<String>,

    /// Initial read capacity; defaults to the read spec minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_capacity: Option<u32>,

    /// Initial write capacity; defaults to the write spec minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_capacity: Option<u32>,

    /// Pass-through `aws_dynamodb_table` attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for [`build_dynamodb_table`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamoTableConfig {
    pub prefix: String,

    pub table: TableConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_capacity: Option<CapacitySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_capacity: Option<CapacitySpec>,

    /// Defaults to provisioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_mode: Option<CapacityMode>,

    /// Defaults to `true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_destroy_table: Option<bool>,

    #[serde(default)]
    pub tags: Tags,
}

impl DynamoTableConfig {
    fn capacity_spec(&self, capacity: CapacityType) -> Option<&CapacitySpec> {
        match capacity {
            CapacityType::Read => self.read_capacity.as_ref(),
            CapacityType::Write => self.write_capacity.as_ref(),
        }
    }
}

/// Declarations produced by [`build_dynamodb_table`]
#[derive(Debug, Clone, PartialEq)]
pub struct DynamoTable {
    pub table: NodeRef,
    /// One role per autoscaled dimension
    pub roles: Vec<AutoscalingRole>,
    /// Table policies first, then index policies, per dimension
    pub scaling_policies: Vec<ScalingPolicy>,
}

struct Resolved {
    mode: CapacityMode,
    stream_view_type: Option<StreamViewType>,
    prevent_destroy: bool,
}

fn resolve(config: &DynamoTableConfig) -> ConstructResult<Resolved> {
    validate_required("prefix", &config.prefix)?;
    validate_required("table.name", &config.table.name)?;
    validate_required("table.hash_key", &config.table.hash_key)?;

    let stream_view_type = validate_stream(
        config.table.stream_enabled,
        config.table.stream_view_type.as_deref(),
    )?;

    for spec in CapacityType::ALL
        .into_iter()
        .filter_map(|capacity| config.capacity_spec(capacity))
    {
        spec.validate()?;
    }

    let autoscaled = config.read_capacity.is_some() || config.write_capacity.is_some();
    let mode = config.capacity_mode.unwrap_or_default();
    validate_capacity_mode(mode, autoscaled)?;

    // Index targets are addressed by name
    if autoscaled {
        for (position, index) in config.table.global_secondary_index.iter().enumerate() {
            index_name(&config.table.name, position, index)?;
        }
    }

    Ok(Resolved {
        mode,
        stream_view_type,
        prevent_destroy: config.prevent_destroy_table.unwrap_or(true),
    })
}

/// Declare a keyed table construct under `scope`
pub fn build_dynamodb_table(
    scope: &mut Scope<'_>,
    id: &str,
    config: &DynamoTableConfig,
) -> ConstructResult<DynamoTable> {
    let resolved = resolve(config)?;
    let table_config = &config.table;
    let mut scope = scope.child(id)?;

    let mut attributes = json!({
        "name": table_config.name,
        "hash_key": table_config.hash_key,
        "attribute": table_config.attribute,
        "billing_mode": resolved.mode.billing_mode(),
        "stream_enabled": table_config.stream_enabled,
        "tags": config.tags,
    });
    if let Some(range_key) = &table_config.range_key {
        attributes["range_key"] = json!(range_key);
    }
    if !table_config.global_secondary_index.is_empty() {
        attributes["global_secondary_index"] = serde_json::to_value(&table_config.global_secondary_index)?;
    }
    if let Some(view) = resolved.stream_view_type {
        attributes["stream_view_type"] = json!(view.as_str());
    }
    if resolved.mode == CapacityMode::Provisioned {
        let initial = |capacity: CapacityType, declared: Option<u32>| {
            declared.or_else(|| config.capacity_spec(capacity).map(|spec| spec.min))
        };
        if let Some(read) = initial(CapacityType::Read, table_config.read_capacity) {
            attributes["read_capacity"] = json!(read);
        }
        if let Some(write) = initial(CapacityType::Write, table_config.write_capacity) {
            attributes["write_capacity"] = json!(write);
        }
    }

    let table = scope.resource(
        "table",
        "aws_dynamodb_table",
        merged_attributes(&table_config.extra, attributes)?.lifecycle(
            Lifecycle::default()
                .ignoring(["read_capacity", "write_capacity"])
                .with_prevent_destroy(resolved.prevent_destroy),
        ),
    )?;

    let mut roles = Vec::new();
    let mut scaling_policies = Vec::new();

    for capacity in CapacityType::ALL {
        let Some(spec) = config.capacity_spec(capacity) else {
            continue;
        };

        let role = create_autoscaling_role(&mut scope, &config.prefix, &table, capacity, &config.tags)?;
        scaling_policies.push(create_table_policy(
            &mut scope,
            &table,
            &table_config.name,
            capacity,
            spec,
            &role,
        )?);
        scaling_policies.extend(create_index_policies(
            &mut scope,
            &table,
            &table_config.name,
            &table_config.global_secondary_index,
            capacity,
            spec,
            &role,
        )?);
        roles.push(role);
    }

    info!(
        table = %table_config.name,
        billing_mode = resolved.mode.billing_mode(),
        prevent_destroy = resolved.prevent_destroy,
        scaling_policies = scaling_policies.len(),
        "Declared keyed table construct"
    );

    Ok(DynamoTable {
        table,
        roles,
        scaling_policies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use crate::errors::ConstructError;

    fn config() -> DynamoTableConfig {
        DynamoTableConfig {
            prefix: "orders".into(),
            table: TableConfig {
                name: "orders".into(),
                hash_key: "pk".into(),
                attribute: vec![AttributeDefinition::new("pk", "S")],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = resolve(&config()).unwrap();
        assert_eq!(resolved.mode, CapacityMode::Provisioned);
        assert!(resolved.prevent_destroy);
        assert!(resolved.stream_view_type.is_none());
    }

    #[test]
    fn test_resolve_rejects_on_demand_with_specs() {
        let mut config = config();
        config.capacity_mode = Some(CapacityMode::OnDemand);
        config.write_capacity = Some(CapacitySpec {
            tracking: 70.0,
            max: 10,
            min: 1,
        });
        assert!(matches!(
            resolve(&config),
            Err(ConstructError::Validation(ValidationError::OnDemandWithCapacity))
        ));
    }

    #[test]
    fn test_resolve_rejects_inverted_bounds() {
        let mut config = config();
        config.read_capacity = Some(CapacitySpec {
            tracking: 70.0,
            max: 1,
            min: 5,
        });
        assert!(matches!(
            resolve(&config),
            Err(ConstructError::Validation(ValidationError::CapacityBoundsInverted { min: 5, max: 1 }))
        ));
    }

    #[test]
    fn test_index_capacity_lookup() {
        let index = SecondaryIndex {
            name: Some("by-customer".into()),
            read_capacity: Some(2),
            write_capacity: Some(3),
            ..Default::default()
        };
        assert_eq!(index.capacity(CapacityType::Read), Some(2));
        assert_eq!(index.capacity(CapacityType::Write), Some(3));
    }
}
