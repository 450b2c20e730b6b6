//! Centralized serialization and deserialization functions.
//!
//! This module provides a unified interface for encoding and decoding
//! documents using postcard serialization, with consistent error handling
//! via snafu.

use serde::{de::DeserializeOwned, Serialize};
use snafu::Snafu;

/// Error type for codec operations.
#[derive(Debug, Snafu)]
pub enum CodecError {
    /// Encoding failed.
    #[snafu(display("Encoding failed: {source}"))]
    Encode {
        /// The underlying postcard error.
        source: postcard::Error,
    },

    /// Decoding failed.
    #[snafu(display("Decoding failed: {source}"))]
    Decode {
        /// The underlying postcard error.
        source: postcard::Error,
    },
}

/// Encodes a value to bytes using postcard serialization.
///
/// # Errors
///
/// Returns `CodecError::Encode` if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(value).map_err(|source| CodecError::Encode { source })
}

/// Decodes bytes to a value using postcard deserialization.
///
/// # Errors
///
/// Returns `CodecError::Decode` if deserialization fails.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    postcard::from_bytes(bytes).map_err(|source| CodecError::Decode { source })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{LedgerEntry, PointSource, StoreItem};
    use crate::ids::ItemId;

    #[test]
    fn test_roundtrip_ledger_entry() {
        let original = LedgerEntry {
            delta: -60,
            reason: "Redeemed points for store order".to_string(),
            source: PointSource::StorePurchase,
            source_id: Some(42),
            created_at: Utc::now(),
        };
        let bytes = encode(&original).expect("encode entry");
        let decoded: LedgerEntry = decode(&bytes).expect("decode entry");
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_roundtrip_store_item() {
        let original = StoreItem {
            id: ItemId::new(3),
            name: "Steel bottle".to_string(),
            points_cost: 30,
            stock_quantity: 12,
            is_available: true,
        };
        let bytes = encode(&original).expect("encode item");
        let decoded: StoreItem = decode(&bytes).expect("decode item");
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_decode_malformed_input() {
        let malformed = [0xFF, 0xFF, 0xFF, 0xFF];
        let result: Result<StoreItem, _> = decode(&malformed);
        let err = result.unwrap_err();
        assert!(matches!(err, CodecError::Decode { .. }));
        assert!(err.to_string().starts_with("Decoding failed"));
    }

    #[test]
    fn test_decode_truncated_data() {
        let item = StoreItem {
            id: ItemId::new(1),
            name: "Tote".to_string(),
            points_cost: 10,
            stock_quantity: 1,
            is_available: true,
        };
        let bytes = encode(&item).expect("encode");
        let truncated = &bytes[..2.min(bytes.len())];
        assert!(decode::<StoreItem>(truncated).is_err());
    }

    #[test]
    fn test_decode_empty_input() {
        let empty: &[u8] = &[];
        assert!(decode::<u64>(empty).is_err());
    }
}
