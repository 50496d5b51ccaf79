// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declaration Graph
//!
//! In-memory construct tree handed to the external synthesis engine. Builders
//! never talk to a cloud API; they only register declarations under a
//! [`Scope`] and wire them together through [`NodeRef`] handles.
//!
//! # Model
//!
//! ```text
//! Stack ("prod")
//!   └─ Scope "orders"            (construct)
//!        ├─ aws_dynamodb_table   "table"
//!        ├─ aws_iam_policy       "read-autoscaling-policy"
//!        └─ aws_appautoscaling_target ...
//! ```
//!
//! Every declaration has a local id unique within its scope. The handle
//! returned on registration exposes computed attributes as interpolation
//! tokens (`${aws_lb.web_alb.arn}`) which the engine resolves at apply time.
//!
//! # Example
//!
//! ```rust
//! use cim_constructs::graph::{NodeConfig, Stack};
//! use serde_json::json;
//!
//! let mut stack = Stack::new("demo");
//! let mut scope = stack.root();
//! let vpc = scope
//!     .data("vpc", "aws_vpc", NodeConfig::from_json(json!({ "id": "vpc-1" })).unwrap())
//!     .unwrap();
//! assert_eq!(vpc.attr("cidr_block"), "${data.aws_vpc.vpc.cidr_block}");
//! ```

pub mod synth;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

use crate::errors::{ConstructError, ConstructResult};

/// Whether a declaration creates a resource or reads an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Resource owned and managed by the engine
    Managed,
    /// Read-only lookup of an existing resource
    Data,
}

/// Lifecycle hints attached to a declaration at creation time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    /// Create the replacement before destroying the current resource
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub create_before_destroy: bool,

    /// Refuse any plan that destroys this resource
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub prevent_destroy: bool,

    /// Attributes whose drift after creation is ignored
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_changes: Vec<String>,
}

impl Lifecycle {
    /// Lifecycle that replaces by creating first
    pub fn create_before_destroy() -> Self {
        Self {
            create_before_destroy: true,
            ..Self::default()
        }
    }

    /// Add attributes to ignore after creation
    pub fn ignoring<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_changes
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Set destroy protection
    pub fn with_prevent_destroy(mut self, prevent: bool) -> Self {
        self.prevent_destroy = prevent;
        self
    }

    /// True when no hint is set
    pub fn is_empty(&self) -> bool {
        !self.create_before_destroy && !self.prevent_destroy && self.ignore_changes.is_empty()
    }
}

/// Configuration for one declaration: provider attributes plus graph metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeConfig {
    attributes: Map<String, Value>,
    depends_on: Vec<NodeRef>,
    lifecycle: Lifecycle,
}

impl NodeConfig {
    /// Build from a JSON object of provider attributes
    pub fn from_json(attributes: Value) -> ConstructResult<Self> {
        match attributes {
            Value::Object(attributes) => Ok(Self {
                attributes,
                ..Self::default()
            }),
            other => Err(ConstructError::Serialization(format!(
                "declaration attributes must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Build from any serializable record
    pub fn from_record<T: Serialize>(record: &T) -> ConstructResult<Self> {
        Self::from_json(serde_json::to_value(record)?)
    }

    /// Add a dependency edge
    pub fn depends_on(mut self, node: &NodeRef) -> Self {
        if !self.depends_on.contains(node) {
            self.depends_on.push(node.clone());
        }
        self
    }

    /// Attach lifecycle hints
    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

/// Handle to a registered declaration
///
/// Cheap to clone; carries only what is needed to reference the node from
/// other declarations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    mode: Mode,
    kind: String,
    unique_id: String,
    index: usize,
}

impl NodeRef {
    /// Resource kind, e.g. `aws_lb`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Tree-wide unique id derived from the construct path
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Declaration mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Fully qualified address used in `depends_on`
    pub fn fqn(&self) -> String {
        match self.mode {
            Mode::Managed => format!("{}.{}", self.kind, self.unique_id),
            Mode::Data => format!("data.{}.{}", self.kind, self.unique_id),
        }
    }

    /// Interpolation token for a computed attribute
    pub fn attr(&self, name: &str) -> String {
        format!("${{{}.{}}}", self.fqn(), name)
    }

    /// Shorthand for `attr("id")`
    pub fn id(&self) -> String {
        self.attr("id")
    }

    /// Shorthand for `attr("arn")`
    pub fn arn(&self) -> String {
        self.attr("arn")
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// One registered declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Construct path of the owning scope (stack name first)
    pub scope: Vec<String>,
    /// Id unique within the owning scope
    pub local_id: String,
    /// Managed resource or data lookup
    pub mode: Mode,
    /// Provider resource kind
    pub kind: String,
    /// Tree-wide unique id
    pub unique_id: String,
    /// Provider attributes
    pub attributes: Map<String, Value>,
    /// Explicit dependency edges
    pub depends_on: Vec<NodeRef>,
    /// Lifecycle hints
    pub lifecycle: Lifecycle,
}

impl Declaration {
    /// Read one provider attribute
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// True when this declaration depends on `node`
    pub fn depends_on_node(&self, node: &NodeRef) -> bool {
        self.depends_on.contains(node)
    }
}

/// Root of a construct tree
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    declarations: Vec<Declaration>,
    local_ids: BTreeSet<(Vec<String>, String)>,
    unique_ids: BTreeSet<String>,
}

impl Stack {
    /// Create an empty stack
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
            local_ids: BTreeSet::new(),
            unique_ids: BTreeSet::new(),
        }
    }

    /// Stack name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root scope for registering constructs
    pub fn root(&mut self) -> Scope<'_> {
        let path = vec![self.name.clone()];
        Scope { stack: self, path }
    }

    /// All declarations in registration order
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// True when nothing has been declared
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Resolve a handle back to its declaration
    pub fn get(&self, node: &NodeRef) -> Option<&Declaration> {
        self.declarations.get(node.index)
    }

    /// All declarations of a kind, in registration order
    pub fn find(&self, kind: &str) -> Vec<&Declaration> {
        self.declarations
            .iter()
            .filter(|decl| decl.kind == kind)
            .collect()
    }

    /// Render the tree for the synthesis engine
    pub fn synthesize(&self) -> Value {
        synth::synthesize(self)
    }

    /// Check a local id without reserving it
    fn check_local_id(
        &self,
        scope: &[String],
        id: &str,
    ) -> ConstructResult<(Vec<String>, String)> {
        if id.is_empty() || id.contains('/') {
            return Err(ConstructError::InvalidId(id.to_string()));
        }

        let key = (scope.to_vec(), id.to_string());
        if self.local_ids.contains(&key) {
            return Err(ConstructError::DuplicateId {
                scope: scope.join("/"),
                id: id.to_string(),
            });
        }
        Ok(key)
    }
}

/// A position in the construct tree
///
/// Borrowing the stack mutably keeps construction single-pass: a scope and
/// its children cannot outlive one builder call.
#[derive(Debug)]
pub struct Scope<'a> {
    stack: &'a mut Stack,
    path: Vec<String>,
}

impl<'a> Scope<'a> {
    /// Construct path, stack name first
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Open a nested construct scope
    pub fn child(&mut self, id: &str) -> ConstructResult<Scope<'_>> {
        let key = self.stack.check_local_id(&self.path, id)?;
        self.stack.local_ids.insert(key);
        let mut path = self.path.clone();
        path.push(id.to_string());
        Ok(Scope {
            stack: &mut *self.stack,
            path,
        })
    }

    /// Declare a managed resource
    pub fn resource(
        &mut self,
        id: &str,
        kind: &str,
        config: NodeConfig,
    ) -> ConstructResult<NodeRef> {
        self.declare(id, Mode::Managed, kind, config)
    }

    /// Declare a data lookup
    pub fn data(&mut self, id: &str, kind: &str, config: NodeConfig) -> ConstructResult<NodeRef> {
        self.declare(id, Mode::Data, kind, config)
    }

    /// Register a declaration as a child of this scope
    pub fn declare(
        &mut self,
        id: &str,
        mode: Mode,
        kind: &str,
        config: NodeConfig,
    ) -> ConstructResult<NodeRef> {
        let key = self.stack.check_local_id(&self.path, id)?;

        let unique_id = unique_id(&self.path, id);
        let node = NodeRef {
            mode,
            kind: kind.to_string(),
            unique_id: unique_id.clone(),
            index: self.stack.declarations.len(),
        };

        // Path segments joined with `_` can collide across scopes
        if !self.stack.unique_ids.insert(node.fqn()) {
            return Err(ConstructError::DuplicateId {
                scope: self.path.join("/"),
                id: id.to_string(),
            });
        }
        self.stack.local_ids.insert(key);

        debug!(
            kind = kind,
            unique_id = %unique_id,
            depends_on = config.depends_on.len(),
            "Declared {}",
            node.fqn()
        );

        self.stack.declarations.push(Declaration {
            scope: self.path.clone(),
            local_id: id.to_string(),
            mode,
            kind: kind.to_string(),
            unique_id,
            attributes: config.attributes,
            depends_on: config.depends_on,
            lifecycle: config.lifecycle,
        });

        Ok(node)
    }
}

/// Tree-wide id: construct path below the stack joined with `_`
fn unique_id(scope: &[String], id: &str) -> String {
    scope
        .iter()
        .skip(1)
        .map(String::as_str)
        .chain(std::iter::once(id))
        .map(sanitize)
        .collect::<Vec<_>>()
        .join("_")
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty() -> NodeConfig {
        NodeConfig::default()
    }

    #[test]
    fn test_unique_id_follows_construct_path() {
        let mut stack = Stack::new("prod");
        let mut root = stack.root();
        let mut orders = root.child("orders").unwrap();
        let table = orders.resource("table", "aws_dynamodb_table", empty()).unwrap();

        assert_eq!(table.unique_id(), "orders_table");
        assert_eq!(table.fqn(), "aws_dynamodb_table.orders_table");
        assert_eq!(table.arn(), "${aws_dynamodb_table.orders_table.arn}");
    }

    #[test]
    fn test_data_references_are_prefixed() {
        let mut stack = Stack::new("prod");
        let vpc = stack.root().data("vpc", "aws_vpc", empty()).unwrap();
        assert_eq!(vpc.mode(), Mode::Data);
        assert_eq!(vpc.fqn(), "data.aws_vpc.vpc");
        assert_eq!(vpc.attr("cidr_block"), "${data.aws_vpc.vpc.cidr_block}");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut stack = Stack::new("prod");
        let mut root = stack.root();
        root.resource("sg", "aws_security_group", empty()).unwrap();

        let err = root
            .resource("sg", "aws_security_group", empty())
            .unwrap_err();
        assert!(matches!(err, ConstructError::DuplicateId { .. }));
    }

    #[test]
    fn test_same_id_allowed_in_sibling_scopes() {
        let mut stack = Stack::new("prod");
        let mut root = stack.root();
        root.child("a")
            .unwrap()
            .resource("sg", "aws_security_group", empty())
            .unwrap();
        root.child("b")
            .unwrap()
            .resource("sg", "aws_security_group", empty())
            .unwrap();

        assert_eq!(stack.find("aws_security_group").len(), 2);
    }

    #[test]
    fn test_path_collision_leaves_local_id_free() {
        let mut stack = Stack::new("prod");
        let mut root = stack.root();
        // `a_b` at the root and `b` under `a` share the unique id `a_b`
        root.resource("a_b", "aws_security_group", empty()).unwrap();
        let mut a = root.child("a").unwrap();

        let err = a.resource("b", "aws_security_group", empty()).unwrap_err();
        assert!(matches!(err, ConstructError::DuplicateId { .. }));

        let retry = a.resource("b", "aws_iam_role", empty()).unwrap();
        assert_eq!(retry.fqn(), "aws_iam_role.a_b");
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_invalid_ids_rejected() {
        let mut stack = Stack::new("prod");
        let mut root = stack.root();
        assert!(matches!(
            root.resource("", "aws_lb", empty()),
            Err(ConstructError::InvalidId(_))
        ));
        assert!(matches!(
            root.child("a/b"),
            Err(ConstructError::InvalidId(_))
        ));
    }

    #[test]
    fn test_attributes_must_be_object() {
        assert!(NodeConfig::from_json(json!(["not", "an", "object"])).is_err());
        assert!(NodeConfig::from_json(json!({ "name": "x" })).is_ok());
    }

    #[test]
    fn test_depends_on_is_deduplicated() {
        let mut stack = Stack::new("prod");
        let mut root = stack.root();
        let role = root.resource("role", "aws_iam_role", empty()).unwrap();
        let target = root
            .resource(
                "target",
                "aws_appautoscaling_target",
                empty().depends_on(&role).depends_on(&role),
            )
            .unwrap();

        let decl = stack.get(&target).unwrap();
        assert_eq!(decl.depends_on.len(), 1);
        assert!(decl.depends_on_node(&role));
    }

    #[test]
    fn test_lifecycle_builders() {
        let lifecycle = Lifecycle::default()
            .ignoring(["read_capacity", "write_capacity"])
            .with_prevent_destroy(true);
        assert!(lifecycle.prevent_destroy);
        assert_eq!(lifecycle.ignore_changes.len(), 2);
        assert!(!lifecycle.is_empty());
        assert!(Lifecycle::default().is_empty());
    }
}
