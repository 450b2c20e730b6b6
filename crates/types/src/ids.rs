//! Identifier newtypes for ClearStream documents.
//!
//! Every persisted document is keyed by a 64-bit snowflake identifier (see
//! [`crate::snowflake`]). The newtypes here prevent mixing identifiers from
//! different collections at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `i64` for type-safe identifiers.
///
/// Each generated type provides:
/// - Standard derives: Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord
/// - Serde with `#[serde(transparent)]` for wire format compatibility
/// - `From<i64>` and `Into<i64>` conversions
/// - `Display` with a semantic prefix (e.g., `user:123`)
/// - `new()` constructor and `value()` accessor
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:expr
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from a raw value.
            #[inline]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw numeric value.
            #[inline]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            #[inline]
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", $prefix, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user account.
    ///
    /// Formats with `user:` prefix: `user:42`.
    UserId, "user"
);

define_id!(
    /// Unique identifier for a campaign.
    ///
    /// Formats with `campaign:` prefix: `campaign:7`.
    CampaignId, "campaign"
);

define_id!(
    /// Unique identifier for a store redemption order.
    ///
    /// Formats with `order:` prefix: `order:19`.
    OrderId, "order"
);

define_id!(
    /// Unique identifier for a store item.
    ///
    /// Formats with `item:` prefix: `item:3`.
    ItemId, "item"
);

define_id!(
    /// Unique identifier for a pollution report.
    ///
    /// Formats with `report:` prefix: `report:88`.
    ReportId, "report"
);
