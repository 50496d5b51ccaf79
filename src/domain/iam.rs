// Copyright (c) 2025 - Cowboy AI, Inc.
//! IAM Policy Documents
//!
//! Typed policy documents serialized in the provider's PascalCase format.
//!
//! # Examples
//!
//! ```rust
//! use cim_constructs::domain::{PolicyDocument, Principal, Statement};
//!
//! let trust = PolicyDocument::new(vec![Statement::allow(["sts:AssumeRole"], Vec::<String>::new())
//!     .with_principal(Principal::Service("application-autoscaling.amazonaws.com".into()))]);
//! let json = trust.to_json().unwrap();
//! assert!(json.contains("\"Version\":\"2012-10-17\""));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::ConstructResult;

/// Policy language version accepted by the provider
pub const POLICY_VERSION: &str = "2012-10-17";

/// Statement effect; constructs only ever grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
}

/// Principal a statement applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// Account or role ARN
    #[serde(rename = "AWS")]
    Aws(String),
    /// Service principal, e.g. `elasticloadbalancing.amazonaws.com`
    Service(String),
}

/// Single policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    pub action: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub resource: Vec<String>,
}

impl Statement {
    /// Allow `actions` on `resources`
    pub fn allow<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            sid: None,
            effect: Effect::Allow,
            principal: None,
            action: actions.into_iter().map(Into::into).collect(),
            resource: resources.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the statement id
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    /// Restrict the statement to a principal
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }
}

/// IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    /// Document with the current policy version
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    /// Serialize for a `policy` / `assume_role_policy` attribute
    pub fn to_json(&self) -> ConstructResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
