//! Fixed table definitions for the document store.
//!
//! The store has exactly 5 tables, all known at compile time. This enables
//! type-safe access through marker types and eliminates dynamic table lookup.
//! Every table is keyed by a document's Snowflake `i64` identifier.

/// Compile-time table identifier. All tables are statically defined; dynamic
/// creation is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TableId {
    /// User documents: user_id -> postcard `User`.
    Users = 0,

    /// Campaign documents: campaign_id -> postcard `Campaign`.
    Campaigns = 1,

    /// Order documents: order_id -> postcard `Order`.
    Orders = 2,

    /// Store item documents: item_id -> postcard `StoreItem`.
    StoreItems = 3,

    /// Pollution report documents: report_id -> postcard `Report`.
    Reports = 4,
}

impl TableId {
    /// Total number of tables.
    pub const COUNT: usize = 5;

    /// Returns the table's slot in the committed-state array.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Marker trait for compile-time table access.
///
/// Implemented by zero-sized marker types so call sites read as
/// `txn.get::<tables::Users>(id)`.
pub trait Table {
    /// The table this marker selects.
    const ID: TableId;
}

/// Users table marker.
pub struct Users;
impl Table for Users {
    const ID: TableId = TableId::Users;
}

/// Campaigns table marker.
pub struct Campaigns;
impl Table for Campaigns {
    const ID: TableId = TableId::Campaigns;
}

/// Orders table marker.
pub struct Orders;
impl Table for Orders {
    const ID: TableId = TableId::Orders;
}

/// Store items table marker.
pub struct StoreItems;
impl Table for StoreItems {
    const ID: TableId = TableId::StoreItems;
}

/// Reports table marker.
pub struct Reports;
impl Table for Reports {
    const ID: TableId = TableId::Reports;
}

/// Encodes an `i64` key so that byte-wise ordering matches numeric ordering.
///
/// Flips the sign bit and emits big-endian bytes. Negative keys sort before
/// non-negative ones, which keeps range scans in numeric order.
#[inline]
#[must_use]
pub fn encode_key(key: i64) -> [u8; 8] {
    ((key as u64) ^ (1 << 63)).to_be_bytes()
}

/// Inverse of [`encode_key`].
#[inline]
#[must_use]
pub fn decode_key(bytes: &[u8; 8]) -> i64 {
    (u64::from_be_bytes(*bytes) ^ (1 << 63)) as i64
}
