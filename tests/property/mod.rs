// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Construct validation and fan-out properties checked with proptest.

mod construct_properties;
