//! Shared test utilities for ClearStream crates.
//!
//! This crate provides common test helpers to reduce boilerplate across test
//! modules:
//!
//! - [`assert_eventually`] - Poll a condition until it's true or timeout
//! - [`fixtures`] - Minimal, internally consistent document builders
//! - [`strategies`] - Proptest generators for domain values

#![deny(unsafe_code)]

mod assertions;
pub use assertions::assert_eventually;

pub mod fixtures;
pub mod strategies;
