// Copyright (c) 2025 - Cowboy AI, Inc.
//! Construct Domain Models
//!
//! Value objects shared by the construct builders. Every enumeration the
//! external engine matches on keeps its exact wire string.
//!
//! # Value Objects with Invariants
//!
//! - [`CapacitySpec`] - target tracking percentage plus min/max bounds
//! - [`CapacityType`] - read or write throughput dimension
//! - [`CapacityMode`] - provisioned vs on-demand billing
//! - [`StreamViewType`] - shape of change-stream records
//! - [`PolicyDocument`] - IAM policy in provider wire format
//!
//! # Invariants
//!
//! Pure validation functions live in [`invariants`]; builders call them in
//! their resolve step, before any declaration is registered.

pub mod capacity;
pub mod iam;
pub mod invariants;
pub mod stream;
pub mod tags;

pub use capacity::{CapacityMode, CapacitySpec, CapacityType};
pub use iam::{Effect, PolicyDocument, Principal, Statement};
pub use invariants::{ValidationError, ValidationResult};
pub use stream::StreamViewType;
pub use tags::{with_name_tag, Tags};
