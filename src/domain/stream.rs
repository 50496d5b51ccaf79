// Copyright (c) 2025 - Cowboy AI, Inc.
//! Change Stream View Type

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::invariants::ValidationError;

/// What each change-stream record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamViewType {
    /// Only the key attributes of the modified item
    KeysOnly,
    /// The item as it appears after modification
    NewImage,
    /// The item as it appeared before modification
    OldImage,
    /// Both images
    NewAndOldImages,
}

impl StreamViewType {
    /// Every accepted view type
    pub const ALL: [StreamViewType; 4] = [
        StreamViewType::KeysOnly,
        StreamViewType::NewImage,
        StreamViewType::OldImage,
        StreamViewType::NewAndOldImages,
    ];

    /// Provider wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeysOnly => "KEYS_ONLY",
            Self::NewImage => "NEW_IMAGE",
            Self::OldImage => "OLD_IMAGE",
            Self::NewAndOldImages => "NEW_AND_OLD_IMAGES",
        }
    }
}

impl fmt::Display for StreamViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamViewType {
    type Err = ValidationError;

    /// Exact match only; the provider does not normalize case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStreamViewType(s.to_string()))
    }
}
