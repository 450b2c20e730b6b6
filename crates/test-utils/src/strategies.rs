//! Proptest strategies for ClearStream domain types.
//!
//! Reusable generators for property-based testing across crates. Strategies
//! produce well-formed domain values while exploring edge cases through
//! random variation.
//!
//! # Usage
//!
//! ```no_run
//! use clearstream_test_utils::strategies;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn my_property(delta in strategies::arb_credit()) {
//!         // test invariant with a randomly generated credit amount
//!     }
//! }
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use clearstream_types::{PointSource, Severity};
use proptest::prelude::*;

/// Generates a positive ledger credit in `1..=1000`.
pub fn arb_credit() -> impl Strategy<Value = i64> {
    1i64..=1000
}

/// Generates a nonzero ledger delta in `-1000..=1000`.
pub fn arb_delta() -> impl Strategy<Value = i64> {
    (-1000i64..=1000).prop_filter("delta must be nonzero", |d| *d != 0)
}

/// Generates a sequence of 1-20 positive credits.
pub fn arb_credits() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(arb_credit(), 1..=20)
}

/// Generates an arbitrary point source.
pub fn arb_point_source() -> impl Strategy<Value = PointSource> {
    prop::sample::select(vec![
        PointSource::Signup,
        PointSource::CampaignCreation,
        PointSource::CampaignParticipation,
        PointSource::CampaignReward,
        PointSource::ReportSubmission,
        PointSource::ReportApproval,
        PointSource::StorePurchase,
        PointSource::StoreRefund,
    ])
}

/// Generates an arbitrary report severity.
pub fn arb_severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(vec![
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ])
}

/// Generates a well-ordered campaign window (`start < end`) within 2024-2026.
pub fn arb_campaign_window() -> impl Strategy<Value = (DateTime<Utc>, DateTime<Utc>)> {
    let base = || {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    };
    (0i64..730, 1i64..90).prop_map(move |(start_offset_days, len_days)| {
        let start = base() + Duration::days(start_offset_days);
        (start, start + Duration::days(len_days))
    })
}

/// Generates an order quantity in `1..=10`.
pub fn arb_quantity() -> impl Strategy<Value = u32> {
    1u32..=10
}

/// Generates a per-unit item cost in `1..=500`.
pub fn arb_points_cost() -> impl Strategy<Value = i64> {
    1i64..=500
}
