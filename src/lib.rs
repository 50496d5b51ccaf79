//! Opinionated cloud resource constructs for the Composable Information Machine
//!
//! Builders assemble load balancers, relational clusters and autoscaled
//! tables into bundles of lower-level declarations (security groups, subnet
//! groups, IAM roles and policies, autoscaling targets, secrets) registered
//! in an in-memory declaration graph. The graph is handed to an external
//! synthesis engine; nothing here talks to a cloud API.
//!
//! ```rust
//! use cim_constructs::{build_dynamodb_table, DynamoTableConfig, Stack, TableConfig};
//!
//! let mut stack = Stack::new("prod");
//! let config = DynamoTableConfig {
//!     prefix: "orders".into(),
//!     table: TableConfig {
//!         name: "orders".into(),
//!         hash_key: "pk".into(),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! let table = build_dynamodb_table(&mut stack.root(), "orders", &config).unwrap();
//! assert_eq!(table.table.kind(), "aws_dynamodb_table");
//! ```

pub mod constructs;
pub mod domain;
pub mod errors;
pub mod graph;

// Re-export commonly used types
pub use constructs::{
    build_dynamodb_table, build_load_balancer, build_rds_cluster, AccessLogsConfig,
    AttributeDefinition, AutoscalingRole, BucketConfig, ClusterConfig, DynamoTable,
    DynamoTableConfig, LoadBalancer, LoadBalancerConfig, RdsCluster, RdsClusterConfig,
    ScalingPolicy, SecondaryIndex, SecretPayload, TableConfig,
};
pub use domain::{CapacityMode, CapacitySpec, CapacityType, StreamViewType, Tags, ValidationError};
pub use errors::{ConstructError, ConstructResult};
pub use graph::{Declaration, Lifecycle, Mode, NodeConfig, NodeRef, Scope, Stack};
