//! Domain documents for the campaign platform.
//!
//! Every struct here is a persisted document (postcard-encoded in the store)
//! or an embedded fragment of one. Cross-document invariants are enforced by
//! the engine crate; this module carries the invariant *helpers* so the rules
//! live next to the data they protect:
//!
//! - `User.points` must equal the sum of `points_history` deltas at every
//!   observable instant ([`User::ledger_total`], [`User::apply_entry`]).
//! - A campaign's participant set never exceeds `max_participants` and never
//!   contains the same user twice.
//! - Campaign status only moves forward ([`CampaignStatus::rank`]).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ids::{CampaignId, ItemId, OrderId, ReportId, UserId};

// ============================================================================
// Ledger
// ============================================================================

/// Attribution for a single point-balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointSource {
    /// One-time bonus on account creation.
    Signup,
    /// Fee or bonus tied to creating a campaign.
    CampaignCreation,
    /// Fee tied to joining a paid campaign.
    CampaignParticipation,
    /// Reward distributed when a campaign finishes.
    CampaignReward,
    /// One-time reward for submitting a pollution report.
    ReportSubmission,
    /// One-time reward when a report is accepted in review.
    ReportApproval,
    /// Debit for redeeming store items.
    StorePurchase,
    /// Credit restoring points for a cancelled order.
    StoreRefund,
}

impl fmt::Display for PointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Signup => "signup",
            Self::CampaignCreation => "campaign_creation",
            Self::CampaignParticipation => "campaign_participation",
            Self::CampaignReward => "campaign_reward",
            Self::ReportSubmission => "report_submission",
            Self::ReportApproval => "report_approval",
            Self::StorePurchase => "store_purchase",
            Self::StoreRefund => "store_refund",
        };
        write!(f, "{name}")
    }
}

/// Immutable record of a single point-balance change.
///
/// Entries are append-only: once written to a user's history they are never
/// edited or deleted. The ledger is the auditable source of truth; the
/// denormalized `User.points` balance is a cache maintained in the same
/// transaction as every append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Signed point delta. Never zero.
    pub delta: i64,
    /// Human-readable reason for the change.
    pub reason: String,
    /// Workflow that produced this entry.
    pub source: PointSource,
    /// Identifier of the triggering entity (campaign, order, report), if any.
    pub source_id: Option<i64>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// User
// ============================================================================

/// A user account with its embedded points ledger.
///
/// The ledger lives inside the user document, so the balance and its history
/// are always written together in one transactional unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Document identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email (uniqueness enforced at the API layer).
    pub email: String,
    /// Denormalized balance. Always `>= 0` and equal to the ledger sum.
    pub points: i64,
    /// Append-only ledger, insertion order = chronological.
    pub points_history: Vec<LedgerEntry>,
    /// Campaigns this user currently participates in (set semantics).
    pub participated_campaigns: Vec<CampaignId>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Sum of all ledger entry deltas.
    ///
    /// Equals `self.points` whenever the balance invariant holds.
    #[must_use]
    pub fn ledger_total(&self) -> i64 {
        self.points_history.iter().map(|e| e.delta).sum()
    }

    /// Appends a ledger entry and adjusts the denormalized balance.
    ///
    /// This is the only approved mutation path for `points`; all workflows go
    /// through the engine's ledger module, which calls this inside a write
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if `delta` is zero, or
    /// [`CoreError::InsufficientBalance`] if the entry would drive the
    /// balance negative. In both cases the user is unchanged.
    pub fn apply_entry(&mut self, entry: LedgerEntry) -> Result<()> {
        if entry.delta == 0 {
            return Err(CoreError::Validation {
                message: "ledger entry delta must be nonzero".to_string(),
            });
        }
        let next = self.points + entry.delta;
        if next < 0 {
            return Err(CoreError::InsufficientBalance {
                required: -entry.delta,
                available: self.points,
            });
        }
        self.points = next;
        self.points_history.push(entry);
        Ok(())
    }

    /// Whether the user's back-reference set contains the campaign.
    #[must_use]
    pub fn has_campaign_ref(&self, campaign_id: CampaignId) -> bool {
        self.participated_campaigns.contains(&campaign_id)
    }

    /// Adds the campaign back-reference if not already present.
    pub fn add_campaign_ref(&mut self, campaign_id: CampaignId) {
        if !self.has_campaign_ref(campaign_id) {
            self.participated_campaigns.push(campaign_id);
        }
    }

    /// Removes the campaign back-reference if present.
    pub fn remove_campaign_ref(&mut self, campaign_id: CampaignId) {
        self.participated_campaigns.retain(|c| *c != campaign_id);
    }
}

// ============================================================================
// Campaign
// ============================================================================

/// Lifecycle phase of a campaign, derived from its date window.
///
/// Transitions are strictly forward: `Upcoming -> Active -> Finished`.
/// The persisted status is a floor — once a phase is observed it is never
/// rolled back, even if the campaign's dates are edited afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CampaignStatus {
    /// `now < start_date`.
    Upcoming,
    /// `start_date <= now <= end_date`.
    Active,
    /// `now > end_date`. Terminal.
    Finished,
}

impl CampaignStatus {
    /// Ordinal used to clamp status transitions forward.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Upcoming => 0,
            Self::Active => 1,
            Self::Finished => 2,
        }
    }

    /// Whether this phase admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Finished => "finished",
        };
        write!(f, "{name}")
    }
}

/// A user's membership record inside a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// The participating user.
    pub user: UserId,
    /// When the user joined.
    pub joined_at: DateTime<Utc>,
    /// Whether this membership qualifies for reward distribution.
    ///
    /// Fixed at the moment of an early leave (anti-farming policy); never
    /// recomputed afterwards.
    pub eligible: bool,
}

/// A community campaign document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Document identifier.
    pub id: CampaignId,
    /// Campaign title.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// The user who created the campaign.
    pub creator: UserId,
    /// Start of the active window. Always before `end_date`.
    pub start_date: DateTime<Utc>,
    /// End of the active window.
    pub end_date: DateTime<Utc>,
    /// Capacity. At least 1.
    pub max_participants: u32,
    /// Current participant set; `user` is unique within it.
    pub participants: Vec<Participant>,
    /// Persisted lifecycle phase (a floor, never rolled back).
    pub status: CampaignStatus,
    /// Set exactly once, by the reward distribution engine, when Finished.
    pub rewards_distributed: bool,
    /// Whether joining requires a confirmed payment.
    pub is_paid: bool,
    /// External payment gate; set by the payment-verification collaborator.
    pub payment_confirmed: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Looks up the membership record for a user.
    #[must_use]
    pub fn participant(&self, user: UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user == user)
    }

    /// Mutable variant of [`Campaign::participant`].
    pub fn participant_mut(&mut self, user: UserId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.user == user)
    }

    /// Whether the participant set has reached capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }

    /// Participants whose membership qualifies for reward distribution.
    #[must_use]
    pub fn eligible_participants(&self) -> Vec<&Participant> {
        self.participants.iter().filter(|p| p.eligible).collect()
    }

    /// Whether a join must be gated on the external payment confirmation.
    #[must_use]
    pub fn requires_payment(&self) -> bool {
        self.is_paid && !self.payment_confirmed
    }
}

// ============================================================================
// Store
// ============================================================================

/// A redeemable item in the points store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreItem {
    /// Document identifier.
    pub id: ItemId,
    /// Item name, denormalized onto order lines at purchase time.
    pub name: String,
    /// Points debited per unit. At least 1.
    pub points_cost: i64,
    /// Units currently in stock.
    pub stock_quantity: u32,
    /// Whether the item can currently be ordered.
    pub is_available: bool,
}

impl StoreItem {
    /// Whether the item can be purchased right now.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0 && self.is_available
    }
}

/// Fulfilment state of an order.
///
/// Only `Pending` orders can be cancelled; the cancellation refund and stock
/// restore happen exactly once because the transition out of `Pending` is
/// checked inside the same transaction as the refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created, points debited, stock reserved.
    Pending,
    /// Being prepared for shipment.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the user. Terminal.
    Delivered,
    /// Cancelled and refunded. Terminal.
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// One line of a store order.
///
/// `points_cost` and `item_name` are copied from the store item at purchase
/// time so the historical record survives later item edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The purchased item.
    pub item: ItemId,
    /// Units purchased. At least 1.
    pub quantity: u32,
    /// Per-unit cost at purchase time.
    pub points_cost: i64,
    /// Item name at purchase time.
    pub item_name: String,
}

impl OrderLine {
    /// Total points for this line.
    #[must_use]
    pub fn line_total(&self) -> i64 {
        self.points_cost * i64::from(self.quantity)
    }
}

/// A store redemption order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Document identifier.
    pub id: OrderId,
    /// The purchasing user.
    pub user: UserId,
    /// Purchased lines.
    pub items: Vec<OrderLine>,
    /// Sum of all line totals, debited at creation and refunded on cancel.
    pub total_points_cost: i64,
    /// Fulfilment state.
    pub status: OrderStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Reports
// ============================================================================

/// Severity classification of a pollution report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Review state of a pollution report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    /// Submitted, awaiting review.
    Pending,
    /// Picked up by a reviewer.
    InReview,
    /// Approved; triggers the one-time approval reward.
    Accepted,
    /// Rejected.
    Rejected,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        write!(f, "{name}")
    }
}

/// Geographic point, WGS84.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// One-time reward flags for a report. Each flips false -> true at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRewards {
    /// The submission reward has been credited.
    pub submission_rewarded: bool,
    /// The approval reward has been credited.
    pub approval_rewarded: bool,
}

/// A pollution report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Document identifier.
    pub id: ReportId,
    /// The submitting user.
    pub user: UserId,
    /// Where the pollution was observed.
    pub location: GeoPoint,
    /// Free-form description.
    pub description: String,
    /// Severity chosen by the submitter.
    pub severity: Severity,
    /// Review state.
    pub status: ReportStatus,
    /// One-time reward flags.
    pub rewards: ReportRewards,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: UserId::new(1),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            points: 0,
            points_history: Vec::new(),
            participated_campaigns: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn entry(delta: i64) -> LedgerEntry {
        LedgerEntry {
            delta,
            reason: "test".to_string(),
            source: PointSource::Signup,
            source_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_entry_keeps_balance_equal_to_ledger_sum() {
        let mut user = test_user();
        user.apply_entry(entry(50)).expect("credit");
        user.apply_entry(entry(-20)).expect("debit");
        user.apply_entry(entry(5)).expect("credit");
        assert_eq!(user.points, 35);
        assert_eq!(user.points, user.ledger_total());
        assert_eq!(user.points_history.len(), 3);
    }

    #[test]
    fn test_apply_entry_rejects_zero_delta() {
        let mut user = test_user();
        let err = user.apply_entry(entry(0)).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(user.points_history.is_empty());
    }

    #[test]
    fn test_apply_entry_rejects_overdraft_and_leaves_user_unchanged() {
        let mut user = test_user();
        user.apply_entry(entry(10)).expect("credit");
        let err = user.apply_entry(entry(-11)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientBalance { required: 11, available: 10 }
        ));
        assert_eq!(user.points, 10);
        assert_eq!(user.points_history.len(), 1);
    }

    #[test]
    fn test_campaign_ref_set_semantics() {
        let mut user = test_user();
        let c = CampaignId::new(9);
        user.add_campaign_ref(c);
        user.add_campaign_ref(c);
        assert_eq!(user.participated_campaigns.len(), 1);
        user.remove_campaign_ref(c);
        assert!(user.participated_campaigns.is_empty());
    }

    #[test]
    fn test_status_rank_is_strictly_increasing() {
        assert!(CampaignStatus::Upcoming.rank() < CampaignStatus::Active.rank());
        assert!(CampaignStatus::Active.rank() < CampaignStatus::Finished.rank());
        assert!(CampaignStatus::Finished.is_terminal());
        assert!(!CampaignStatus::Active.is_terminal());
    }

    #[test]
    fn test_store_item_in_stock() {
        let mut item = StoreItem {
            id: ItemId::new(1),
            name: "Bottle".to_string(),
            points_cost: 30,
            stock_quantity: 2,
            is_available: true,
        };
        assert!(item.in_stock());
        item.stock_quantity = 0;
        assert!(!item.in_stock());
        item.stock_quantity = 5;
        item.is_available = false;
        assert!(!item.in_stock());
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            item: ItemId::new(1),
            quantity: 3,
            points_cost: 30,
            item_name: "Bottle".to_string(),
        };
        assert_eq!(line.line_total(), 90);
    }

    #[test]
    fn test_campaign_participant_lookup_and_capacity() {
        let now = Utc::now();
        let mut campaign = Campaign {
            id: CampaignId::new(1),
            name: "Cleanup".to_string(),
            description: "River cleanup".to_string(),
            creator: UserId::new(1),
            start_date: now,
            end_date: now + chrono::Duration::days(1),
            max_participants: 1,
            participants: Vec::new(),
            status: CampaignStatus::Active,
            rewards_distributed: false,
            is_paid: false,
            payment_confirmed: false,
            created_at: now,
        };
        assert!(!campaign.is_full());
        campaign.participants.push(Participant {
            user: UserId::new(2),
            joined_at: now,
            eligible: true,
        });
        assert!(campaign.is_full());
        assert!(campaign.participant(UserId::new(2)).is_some());
        assert!(campaign.participant(UserId::new(3)).is_none());
        assert_eq!(campaign.eligible_participants().len(), 1);
    }
}
