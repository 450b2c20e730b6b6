//! Core types, errors, and configuration for the ClearStream campaign platform.
//!
//! This crate provides the foundational types used throughout the platform:
//! - Identifier newtypes (UserId, CampaignId, etc.)
//! - Domain documents (User, Campaign, Order, Report, StoreItem)
//! - The append-only ledger entry type and point sources
//! - Error types using snafu, with machine-readable error codes
//! - Configuration structs with validating builders

#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod ids;
pub mod snowflake;

// Re-export commonly used types at crate root
pub use codec::{decode, encode, CodecError};
pub use domain::*;
pub use error::{CoreError, ErrorCode, Result};
pub use ids::{CampaignId, ItemId, OrderId, ReportId, UserId};
