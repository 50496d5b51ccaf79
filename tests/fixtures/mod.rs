// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-constructs
//!
//! Deterministic construct inputs shared by the integration tests.
//!
//! # Design Principles
//! - Fixtures are the ONLY place that assembles full builder configs
//! - Tests tweak a fixture's fields instead of building configs inline
//! - Declarations are looked up by kind and local id, never by position

#![allow(dead_code)]

use cim_constructs::{
    AttributeDefinition, CapacitySpec, ClusterConfig, Declaration, DynamoTableConfig,
    LoadBalancerConfig, RdsClusterConfig, SecondaryIndex, Stack, TableConfig, Tags,
};
use serde_json::{json, Map};

pub const VPC_ID: &str = "vpc-0a1b2c3d";
pub const SUBNET_A: &str = "subnet-0aaa";
pub const SUBNET_B: &str = "subnet-0bbb";

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn tags() -> Tags {
    let mut tags = Tags::new();
    tags.insert("team".into(), "payments".into());
    tags.insert("env".into(), "test".into());
    tags
}

pub fn load_balancer_config() -> LoadBalancerConfig {
    LoadBalancerConfig {
        prefix: "Orders".into(),
        short_name: "orders-alb".into(),
        vpc_id: VPC_ID.into(),
        subnet_ids: vec![SUBNET_A.into(), SUBNET_B.into()],
        tags: tags(),
        ..Default::default()
    }
}

pub fn rds_config(engine: &str) -> RdsClusterConfig {
    RdsClusterConfig {
        prefix: "Orders".into(),
        vpc_id: VPC_ID.into(),
        subnet_ids: vec![SUBNET_A.into(), SUBNET_B.into()],
        cluster: ClusterConfig {
            cluster_identifier: "orders-db".into(),
            engine: engine.into(),
            master_username: "admin".into(),
            database_name: "orders".into(),
            ..Default::default()
        },
        tags: tags(),
    }
}

pub fn capacity(tracking: f64, max: u32, min: u32) -> CapacitySpec {
    CapacitySpec { tracking, max, min }
}

pub fn table_config() -> DynamoTableConfig {
    DynamoTableConfig {
        prefix: "orders".into(),
        table: TableConfig {
            name: "orders".into(),
            hash_key: "pk".into(),
            range_key: Some("sk".into()),
            attribute: vec![
                AttributeDefinition::new("pk", "S"),
                AttributeDefinition::new("sk", "S"),
                AttributeDefinition::new("customer", "S"),
                AttributeDefinition::new("status", "S"),
            ],
            ..Default::default()
        },
        tags: tags(),
        ..Default::default()
    }
}

pub fn secondary_index(name: &str, hash_key: &str, read: u32, write: u32) -> SecondaryIndex {
    let mut extra = Map::new();
    extra.insert("hash_key".into(), json!(hash_key));
    extra.insert("projection_type".into(), json!("ALL"));
    SecondaryIndex {
        name: Some(name.into()),
        read_capacity: Some(read),
        write_capacity: Some(write),
        extra,
    }
}

/// Table with two indexes (read 2 / write 3) and read+write specs {70, 10, 1}
pub fn autoscaled_table_config() -> DynamoTableConfig {
    let mut config = table_config();
    config.table.global_secondary_index = vec![
        secondary_index("by-customer", "customer", 2, 3),
        secondary_index("by-status", "status", 2, 3),
    ];
    config.read_capacity = Some(capacity(70.0, 10, 1));
    config.write_capacity = Some(capacity(70.0, 10, 1));
    config
}

/// Single declaration by kind and local id
pub fn declaration<'a>(stack: &'a Stack, kind: &str, local_id: &str) -> &'a Declaration {
    stack
        .find(kind)
        .into_iter()
        .find(|decl| decl.local_id == local_id)
        .unwrap_or_else(|| panic!("no {} declaration with id {}", kind, local_id))
}
