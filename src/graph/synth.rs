// Copyright (c) 2025 - Cowboy AI, Inc.
//! Synthesis hand-off
//!
//! Renders a [`Stack`] into the JSON document consumed by the external
//! engine:
//!
//! ```text
//! {
//!   "//":       { "metadata": { "stack": "prod" } },
//!   "resource": { "<kind>": { "<unique id>": { ...attributes, depends_on, lifecycle } } },
//!   "data":     { "<kind>": { "<unique id>": { ... } } }
//! }
//! ```
//!
//! Pure function: no I/O, deterministic for a given stack.

use serde_json::{json, Map, Value};
use tracing::info;

use super::{Declaration, Mode, Stack};

/// Render the declaration tree
pub fn synthesize(stack: &Stack) -> Value {
    let mut resource = Map::new();
    let mut data = Map::new();

    for decl in stack.declarations() {
        let block = match decl.mode {
            Mode::Managed => &mut resource,
            Mode::Data => &mut data,
        };

        let by_kind = block
            .entry(decl.kind.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(by_kind) = by_kind {
            by_kind.insert(decl.unique_id.clone(), Value::Object(body(decl)));
        }
    }

    info!(
        stack = stack.name(),
        declarations = stack.len(),
        "Synthesized construct tree"
    );

    let mut document = Map::new();
    document.insert("//".to_string(), json!({ "metadata": { "stack": stack.name() } }));
    if !resource.is_empty() {
        document.insert("resource".to_string(), Value::Object(resource));
    }
    if !data.is_empty() {
        document.insert("data".to_string(), Value::Object(data));
    }
    Value::Object(document)
}

fn body(decl: &Declaration) -> Map<String, Value> {
    let mut body = decl.attributes.clone();

    if !decl.depends_on.is_empty() {
        let edges = decl
            .depends_on
            .iter()
            .map(|node| Value::String(node.fqn()))
            .collect();
        body.insert("depends_on".to_string(), Value::Array(edges));
    }

    if !decl.lifecycle.is_empty() {
        let mut lifecycle = Map::new();
        if decl.lifecycle.create_before_destroy {
            lifecycle.insert("create_before_destroy".to_string(), Value::Bool(true));
        }
        if decl.lifecycle.prevent_destroy {
            lifecycle.insert("prevent_destroy".to_string(), Value::Bool(true));
        }
        if !decl.lifecycle.ignore_changes.is_empty() {
            lifecycle.insert(
                "ignore_changes".to_string(),
                json!(decl.lifecycle.ignore_changes),
            );
        }
        body.insert("lifecycle".to_string(), Value::Object(lifecycle));
    }

    body
}
