// Copyright (c) 2025 - Cowboy AI, Inc.
//! Load Balancer Construct
//!
//! Declares a public-facing security group and an application load balancer
//! attached to it. With access logs enabled, the logs go either to an
//! existing bucket (looked up by name, assumed already writable by the load
//! balancing service) or to a new bucket with a policy that lets the regional
//! load-balancing service account write into it.
//!
//! # Declarations
//!
//! ```text
//! aws_security_group        security-group
//! aws_s3_bucket             log-bucket            (new bucket)
//! data.aws_elb_service_account elb-service-account (new bucket)
//! aws_s3_bucket_policy      log-bucket-policy     (new bucket)
//! data.aws_s3_bucket        existing-log-bucket   (existing bucket)
//! aws_lb                    alb
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::{allow_all_egress, merged_attributes, sg_rule, ANY_IPV4, ANY_IPV6};
use crate::domain::invariants::{
    validate_bucket_choice, validate_log_prefix, validate_required,
};
use crate::domain::{with_name_tag, PolicyDocument, Principal, Statement, Tags, ValidationError};
use crate::errors::ConstructResult;
use crate::graph::{Lifecycle, NodeConfig, NodeRef, Scope};

/// Bucket to create for access logs
///
/// Open record: every attribute is passed to the bucket declaration as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Bucket name; the provider generates one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Access-log delivery settings
///
/// Exactly one of `existing_bucket` and `bucket` must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessLogsConfig {
    /// Name of a bucket that already accepts load balancer logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_bucket: Option<String>,

    /// Bucket to create for the logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<BucketConfig>,

    /// Key prefix, defaults to `server-logs/<prefix>/alb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// Input for [`build_load_balancer`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancerConfig {
    /// Name prefix for derived names and tags
    pub prefix: String,

    /// Load balancer name (provider limit of 32 characters)
    pub short_name: String,

    pub vpc_id: String,

    pub subnet_ids: Vec<String>,

    /// Internal (private) load balancer, defaults to `false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_logs: Option<AccessLogsConfig>,

    #[serde(default)]
    pub tags: Tags,

    /// Pass-through `aws_lb` attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Declarations produced by [`build_load_balancer`]
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalancer {
    pub load_balancer: NodeRef,
    pub security_group: NodeRef,
    /// Log bucket node, new or looked up
    pub log_bucket: Option<NodeRef>,
    /// Policy letting the load-balancing service write logs (new bucket only)
    pub log_bucket_policy: Option<NodeRef>,
}

#[derive(Debug, Clone, PartialEq)]
enum LogBucket {
    Existing(String),
    Create(BucketConfig),
}

#[derive(Debug, Clone, PartialEq)]
struct ResolvedAccessLogs {
    bucket: LogBucket,
    prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    internal: bool,
    access_logs: Option<ResolvedAccessLogs>,
}

/// Default key prefix for a construct prefix
pub fn default_log_prefix(prefix: &str) -> String {
    format!("server-logs/{}/alb", prefix.to_lowercase())
}

fn resolve(config: &LoadBalancerConfig) -> ConstructResult<Resolved> {
    validate_required("prefix", &config.prefix)?;
    validate_required("short_name", &config.short_name)?;
    validate_required("vpc_id", &config.vpc_id)?;
    if config.subnet_ids.is_empty() {
        return Err(ValidationError::MissingField("subnet_ids").into());
    }

    let access_logs = match &config.access_logs {
        None => None,
        Some(logs) => {
            if let Some(name) = &logs.existing_bucket {
                validate_required("access_logs.existing_bucket", name)?;
            }
            validate_bucket_choice(logs.existing_bucket.is_some(), logs.bucket.is_some())?;

            let prefix = logs
                .prefix
                .clone()
                .unwrap_or_else(|| default_log_prefix(&config.prefix));
            validate_log_prefix(&prefix)?;

            let bucket = match (&logs.existing_bucket, &logs.bucket) {
                (Some(name), _) => LogBucket::Existing(name.clone()),
                (None, Some(bucket)) => LogBucket::Create(bucket.clone()),
                (None, None) => return Err(ValidationError::MissingLogBucket.into()),
            };

            Some(ResolvedAccessLogs { bucket, prefix })
        }
    };

    Ok(Resolved {
        internal: config.internal.unwrap_or(false),
        access_logs,
    })
}

/// Declare a load balancer construct under `scope`
pub fn build_load_balancer(
    scope: &mut Scope<'_>,
    id: &str,
    config: &LoadBalancerConfig,
) -> ConstructResult<LoadBalancer> {
    let resolved = resolve(config)?;
    let mut scope = scope.child(id)?;

    let security_group = scope.resource(
        "security-group",
        "aws_security_group",
        NodeConfig::from_json(json!({
            "name_prefix": format!("{}-alb-", config.prefix),
            "description": format!("{} load balancer", config.prefix),
            "vpc_id": config.vpc_id,
            "ingress": [
                sg_rule("HTTPS", 443, 443, "tcp", &[ANY_IPV4], &[ANY_IPV6]),
                sg_rule("HTTP", 80, 80, "tcp", &[ANY_IPV4], &[ANY_IPV6]),
            ],
            "egress": [allow_all_egress()],
            "tags": with_name_tag(&config.tags, format!("{}-alb-sg", config.prefix)),
        }))?
        .lifecycle(Lifecycle::create_before_destroy()),
    )?;

    let mut log_bucket = None;
    let mut log_bucket_policy = None;
    let mut access_logs = Value::Null;

    if let Some(logs) = &resolved.access_logs {
        let bucket_ref = match &logs.bucket {
            LogBucket::Existing(name) => {
                debug!(bucket = %name, "Using existing access log bucket");
                scope.data(
                    "existing-log-bucket",
                    "aws_s3_bucket",
                    NodeConfig::from_json(json!({ "bucket": name }))?,
                )?
            }
            LogBucket::Create(bucket) => {
                let (bucket_ref, policy) =
                    declare_log_bucket(&mut scope, bucket, &config.tags, &config.prefix)?;
                log_bucket_policy = Some(policy);
                bucket_ref
            }
        };

        access_logs = json!({
            "bucket": bucket_ref.id(),
            "prefix": logs.prefix,
            "enabled": true,
        });
        log_bucket = Some(bucket_ref);
    }

    let mut attributes = json!({
        "name": config.short_name,
        "internal": resolved.internal,
        "security_groups": [security_group.id()],
        "subnets": config.subnet_ids,
        "tags": with_name_tag(&config.tags, format!("{}-alb", config.prefix)),
    });
    if !access_logs.is_null() {
        attributes["access_logs"] = access_logs;
    }

    let mut extra = config.extra.clone();
    extra
        .entry("load_balancer_type")
        .or_insert_with(|| json!("application"));

    let mut lb_config = merged_attributes(&extra, attributes)?.depends_on(&security_group);
    if let Some(policy) = &log_bucket_policy {
        lb_config = lb_config.depends_on(policy);
    }
    let load_balancer = scope.resource("alb", "aws_lb", lb_config)?;

    info!(
        prefix = %config.prefix,
        internal = resolved.internal,
        access_logs = resolved.access_logs.is_some(),
        "Declared load balancer construct"
    );

    Ok(LoadBalancer {
        load_balancer,
        security_group,
        log_bucket,
        log_bucket_policy,
    })
}

/// New log bucket plus the policy for the load-balancing service principal
fn declare_log_bucket(
    scope: &mut Scope<'_>,
    bucket: &BucketConfig,
    tags: &Tags,
    prefix: &str,
) -> ConstructResult<(NodeRef, NodeRef)> {
    let mut attributes = serde_json::to_value(bucket)?;
    attributes["tags"] = json!(with_name_tag(tags, format!("{}-alb-logs", prefix)));
    let bucket_ref = scope.resource("log-bucket", "aws_s3_bucket", NodeConfig::from_json(attributes)?)?;

    // The service writes logs as its own regional account, not as the caller
    let service_account = scope.data(
        "elb-service-account",
        "aws_elb_service_account",
        NodeConfig::default(),
    )?;

    let document = PolicyDocument::new(vec![Statement::allow(
        ["s3:PutObject"],
        [format!("{}/*", bucket_ref.arn())],
    )
    .with_sid("AllowLoadBalancerAccessLogs")
    .with_principal(Principal::Aws(service_account.arn()))]);

    let policy = scope.resource(
        "log-bucket-policy",
        "aws_s3_bucket_policy",
        NodeConfig::from_json(json!({
            "bucket": bucket_ref.id(),
            "policy": document.to_json()?,
        }))?
        .depends_on(&bucket_ref)
        .depends_on(&service_account),
    )?;

    Ok((bucket_ref, policy))
}
