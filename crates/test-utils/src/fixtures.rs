//! Fixture builders for domain documents.
//!
//! Each builder returns a minimal, internally consistent document so tests
//! only spell out the fields they care about.

use chrono::{DateTime, Duration, Utc};
use clearstream_types::{
    Campaign, CampaignId, CampaignStatus, GeoPoint, ItemId, Report, ReportId, ReportRewards,
    ReportStatus, Severity, StoreItem, User, UserId,
};

/// A user with a zero balance and empty ledger.
#[must_use]
pub fn user(id: i64) -> User {
    User {
        id: UserId::new(id),
        name: format!("user-{id}"),
        email: format!("user-{id}@example.com"),
        points: 0,
        points_history: Vec::new(),
        participated_campaigns: Vec::new(),
        created_at: Utc::now(),
    }
}

/// A free campaign with the given date window and capacity, no participants.
#[must_use]
pub fn campaign(
    id: i64,
    creator: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_participants: u32,
) -> Campaign {
    let status = if Utc::now() < start {
        CampaignStatus::Upcoming
    } else if Utc::now() <= end {
        CampaignStatus::Active
    } else {
        CampaignStatus::Finished
    };
    Campaign {
        id: CampaignId::new(id),
        name: format!("campaign-{id}"),
        description: "cleanup drive".to_string(),
        creator,
        start_date: start,
        end_date: end,
        max_participants,
        participants: Vec::new(),
        status,
        rewards_distributed: false,
        is_paid: false,
        payment_confirmed: false,
        created_at: Utc::now(),
    }
}

/// A campaign whose window straddles now, so its phase is Active.
#[must_use]
pub fn active_campaign(id: i64, creator: UserId, max_participants: u32) -> Campaign {
    let now = Utc::now();
    campaign(id, creator, now - Duration::hours(1), now + Duration::hours(1), max_participants)
}

/// A campaign whose window ended in the past, so its phase is Finished.
#[must_use]
pub fn finished_campaign(id: i64, creator: UserId, max_participants: u32) -> Campaign {
    let now = Utc::now();
    campaign(id, creator, now - Duration::days(2), now - Duration::days(1), max_participants)
}

/// A campaign that has not started yet.
#[must_use]
pub fn upcoming_campaign(id: i64, creator: UserId, max_participants: u32) -> Campaign {
    let now = Utc::now();
    campaign(id, creator, now + Duration::days(1), now + Duration::days(2), max_participants)
}

/// An available store item.
#[must_use]
pub fn store_item(id: i64, points_cost: i64, stock_quantity: u32) -> StoreItem {
    StoreItem {
        id: ItemId::new(id),
        name: format!("item-{id}"),
        points_cost,
        stock_quantity,
        is_available: true,
    }
}

/// A pending pollution report with no rewards credited.
#[must_use]
pub fn report(id: i64, user: UserId) -> Report {
    Report {
        id: ReportId::new(id),
        user,
        location: GeoPoint { longitude: 77.59, latitude: 12.97 },
        description: "plastic waste near the lake".to_string(),
        severity: Severity::Medium,
        status: ReportStatus::Pending,
        rewards: ReportRewards::default(),
        created_at: Utc::now(),
    }
}
