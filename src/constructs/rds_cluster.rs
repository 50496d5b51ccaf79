// Copyright (c) 2025 - Cowboy AI, Inc.
//! Relational Cluster Construct
//!
//! Declares a private database cluster reachable only from inside its VPC,
//! plus a secret holding the connection details.
//!
//! The master password is a bootstrap value: either supplied or generated
//! once per construction, then rotated out-of-band. The cluster therefore
//! ignores later drift on the master credentials, and no rotation schedule is
//! declared on the secret.
//!
//! # Declarations
//!
//! ```text
//! data.aws_vpc                       vpc
//! aws_security_group                 security-group
//! aws_db_subnet_group                subnet-group
//! aws_rds_cluster                    cluster
//! aws_secretsmanager_secret          secret          (depends on cluster)
//! aws_secretsmanager_secret_version  secret-version  (depends on secret)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::{allow_all_egress, merged_attributes, sg_rule};
use crate::domain::invariants::validate_required;
use crate::domain::{with_name_tag, Tags, ValidationError};
use crate::errors::ConstructResult;
use crate::graph::{Lifecycle, NodeConfig, NodeRef, Scope};

/// Engine that gets a ready-made connection URL in its secret
pub const AURORA_MYSQL: &str = "aurora-mysql";

/// Default port for PostgreSQL-family engines
pub const POSTGRES_PORT: u16 = 5432;

/// Default port for every other engine
pub const MYSQL_PORT: u16 = 3306;

/// Bytes of entropy in a generated master password
const PASSWORD_BYTES: usize = 8;

/// Cluster attributes
///
/// The provider marks the credential and naming fields optional; this
/// construct needs them to build the secret, so they are required here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub cluster_identifier: String,

    /// e.g. `aurora-mysql`, `aurora-postgresql`
    pub engine: String,

    pub master_username: String,

    pub database_name: String,

    /// Generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_password: Option<String>,

    /// Derived from the engine when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Pass-through `aws_rds_cluster` attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for [`build_rds_cluster`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RdsClusterConfig {
    pub prefix: String,
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub tags: Tags,
}

/// Connection details stored as the secret's initial version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretPayload {
    pub engine: String,
    pub host: String,
    pub username: String,
    pub password: String,
    pub dbname: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

impl SecretPayload {
    /// Assemble the payload, adding a connection URL for Aurora MySQL
    pub fn new(
        engine: &str,
        host: impl Into<String>,
        username: &str,
        password: &str,
        dbname: &str,
        port: u16,
    ) -> Self {
        let host = host.into();
        let database_url = (engine == AURORA_MYSQL).then(|| {
            format!(
                "mysql://{}:{}@{}:{}/{}",
                username, password, host, port, dbname
            )
        });

        Self {
            engine: engine.to_string(),
            host,
            username: username.to_string(),
            password: password.to_string(),
            dbname: dbname.to_string(),
            port,
            database_url,
        }
    }
}

/// Declarations produced by [`build_rds_cluster`]
#[derive(Debug, Clone, PartialEq)]
pub struct RdsCluster {
    pub cluster: NodeRef,
    pub security_group: NodeRef,
    pub subnet_group: NodeRef,
    pub secret: NodeRef,
    pub secret_version: NodeRef,
    /// Secret identifier token for consumers of the credentials
    pub secret_id: String,
}

struct Resolved {
    port: u16,
    password: String,
    secret_name: String,
}

/// Port for an engine when none is configured
pub fn default_port(engine: &str) -> u16 {
    if engine.contains("postgresql") {
        POSTGRES_PORT
    } else {
        MYSQL_PORT
    }
}

/// One-time bootstrap password: random bytes, hex encoded
pub fn generate_master_password() -> String {
    let bytes: [u8; PASSWORD_BYTES] = rand::random();
    hex::encode(bytes)
}

fn resolve(config: &RdsClusterConfig) -> ConstructResult<Resolved> {
    validate_required("prefix", &config.prefix)?;
    validate_required("vpc_id", &config.vpc_id)?;
    if config.subnet_ids.is_empty() {
        return Err(ValidationError::MissingField("subnet_ids").into());
    }

    let cluster = &config.cluster;
    validate_required("cluster_identifier", &cluster.cluster_identifier)?;
    validate_required("engine", &cluster.engine)?;
    validate_required("master_username", &cluster.master_username)?;
    validate_required("database_name", &cluster.database_name)?;

    let password = match &cluster.master_password {
        Some(password) => {
            validate_required("master_password", password)?;
            password.clone()
        }
        None => {
            debug!(cluster = %cluster.cluster_identifier, "Generating master password");
            generate_master_password()
        }
    };

    Ok(Resolved {
        port: cluster.port.unwrap_or_else(|| default_port(&cluster.engine)),
        password,
        secret_name: format!("{}/{}", config.prefix, cluster.cluster_identifier),
    })
}

/// Declare a relational cluster construct under `scope`
pub fn build_rds_cluster(
    scope: &mut Scope<'_>,
    id: &str,
    config: &RdsClusterConfig,
) -> ConstructResult<RdsCluster> {
    let resolved = resolve(config)?;
    let cluster_config = &config.cluster;
    let mut scope = scope.child(id)?;

    let vpc = scope.data(
        "vpc",
        "aws_vpc",
        NodeConfig::from_json(json!({ "id": config.vpc_id }))?,
    )?;
    let vpc_cidr = vpc.attr("cidr_block");

    let security_group = scope.resource(
        "security-group",
        "aws_security_group",
        NodeConfig::from_json(json!({
            "name_prefix": format!("{}-rds-", config.prefix),
            "description": format!("{} database cluster", config.prefix),
            "vpc_id": config.vpc_id,
            "ingress": [sg_rule(
                "Database access from within the VPC",
                resolved.port,
                resolved.port,
                "tcp",
                &[vpc_cidr.as_str()],
                &[],
            )],
            "egress": [allow_all_egress()],
            "tags": with_name_tag(&config.tags, format!("{}-rds-sg", config.prefix)),
        }))?,
    )?;

    let subnet_group = scope.resource(
        "subnet-group",
        "aws_db_subnet_group",
        NodeConfig::from_json(json!({
            "name": config.prefix.to_lowercase(),
            "subnet_ids": config.subnet_ids,
            "tags": with_name_tag(&config.tags, format!("{}-subnet-group", config.prefix)),
        }))?,
    )?;

    let cluster = scope.resource(
        "cluster",
        "aws_rds_cluster",
        merged_attributes(
            &cluster_config.extra,
            json!({
                "cluster_identifier": cluster_config.cluster_identifier,
                "engine": cluster_config.engine,
                "master_username": cluster_config.master_username,
                "master_password": resolved.password,
                "database_name": cluster_config.database_name,
                "port": resolved.port,
                "vpc_security_group_ids": [security_group.id()],
                "db_subnet_group_name": subnet_group.attr("name"),
                "copy_tags_to_snapshot": true,
                "tags": config.tags,
            }),
        )?
        .lifecycle(Lifecycle::default().ignoring(["master_username", "master_password"])),
    )?;

    let secret = scope.resource(
        "secret",
        "aws_secretsmanager_secret",
        NodeConfig::from_json(json!({
            "name": resolved.secret_name,
            "description": format!("Connection details for {}", cluster_config.cluster_identifier),
            "tags": config.tags,
        }))?
        .depends_on(&cluster),
    )?;

    let payload = SecretPayload::new(
        &cluster_config.engine,
        cluster.attr("endpoint"),
        &cluster_config.master_username,
        &resolved.password,
        &cluster_config.database_name,
        resolved.port,
    );

    let secret_version = scope.resource(
        "secret-version",
        "aws_secretsmanager_secret_version",
        NodeConfig::from_json(json!({
            "secret_id": secret.id(),
            "secret_string": serde_json::to_string(&payload)?,
        }))?
        .depends_on(&secret),
    )?;

    info!(
        prefix = %config.prefix,
        engine = %cluster_config.engine,
        port = resolved.port,
        secret = %resolved.secret_name,
        "Declared relational cluster construct"
    );

    Ok(RdsCluster {
        secret_id: secret.id(),
        cluster,
        security_group,
        subnet_group,
        secret,
        secret_version,
    })
}
