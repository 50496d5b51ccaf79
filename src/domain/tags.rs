// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Tags

use std::collections::BTreeMap;

/// Provider tags, ordered for deterministic output
pub type Tags = BTreeMap<String, String>;

/// Caller tags plus the construct-derived `Name` tag
///
/// The derived name always wins so declarations stay identifiable in the
/// provider console.
pub fn with_name_tag(tags: &Tags, name: impl Into<String>) -> Tags {
    let mut merged = tags.clone();
    merged.insert("Name".to_string(), name.into());
    merged
}
