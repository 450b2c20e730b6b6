//! Error types for the campaign platform using snafu.
//!
//! Defines a unified error type for the engine's operation surface. Every
//! variant maps to an [`ErrorCode`] with a unique numeric identifier and a
//! retryability classification, so callers (and the API layer above) can
//! react programmatically without string matching.
//!
//! Propagation policy: every variant below is an expected, recoverable-by-
//! caller outcome returned synchronously. Unexpected storage failures are
//! wrapped in [`CoreError::Storage`] and the triggering transaction is
//! guaranteed rolled back (nothing is visible until commit).

use core::fmt;

use snafu::{Location, Snafu};

use crate::domain::{CampaignStatus, OrderStatus};
use crate::ids::{CampaignId, ItemId, OrderId, ReportId, UserId};

/// Unified result type for platform operations.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Machine-readable error codes for programmatic error handling.
///
/// Codes are organized into ranges:
///
/// | Range       | Domain          | Examples                                  |
/// |-------------|-----------------|-------------------------------------------|
/// | 1100–1199   | Not found       | user, campaign, order, item, report       |
/// | 1200–1299   | Domain state    | capacity, balance, stock, phase, payment  |
/// | 1300–1399   | Contention      | transaction retry exhausted               |
/// | 1400–1499   | Validation      | malformed input, date ordering            |
/// | 1500–1599   | Infrastructure  | storage, serialization, internal          |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // --- Not found (1100–1199) ---
    /// User document absent.
    UserNotFound = 1100,
    /// Campaign document absent.
    CampaignNotFound = 1101,
    /// Order document absent.
    OrderNotFound = 1102,
    /// Store item document absent.
    ItemNotFound = 1103,
    /// Report document absent.
    ReportNotFound = 1104,

    // --- Domain state (1200–1299) ---
    /// Campaign phase disallows the action.
    CampaignNotActive = 1200,
    /// User already in the participant set.
    AlreadyJoined = 1201,
    /// User absent from the participant set.
    NotAParticipant = 1202,
    /// Participant set at capacity.
    CapacityExceeded = 1203,
    /// Debit would drive the balance negative.
    InsufficientBalance = 1204,
    /// Requested quantity exceeds stock.
    InsufficientStock = 1205,
    /// Operation not legal in the entity's current state.
    InvalidState = 1206,
    /// Paid campaign action attempted before payment confirmation.
    PaymentNotConfirmed = 1207,

    // --- Contention (1300–1399) ---
    /// Write transaction retries exhausted. Safe to retry from the client.
    Contention = 1300,

    // --- Validation (1400–1499) ---
    /// Malformed input (e.g. start_date >= end_date).
    Validation = 1400,

    // --- Infrastructure (1500–1599) ---
    /// Storage-layer failure.
    Storage = 1500,
    /// Serialization or deserialization failure.
    Serialization = 1501,
    /// Unexpected state or invariant violation.
    Internal = 1502,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a numeric code to an `ErrorCode`, returning `None` for unknown values.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1100 => Some(Self::UserNotFound),
            1101 => Some(Self::CampaignNotFound),
            1102 => Some(Self::OrderNotFound),
            1103 => Some(Self::ItemNotFound),
            1104 => Some(Self::ReportNotFound),
            1200 => Some(Self::CampaignNotActive),
            1201 => Some(Self::AlreadyJoined),
            1202 => Some(Self::NotAParticipant),
            1203 => Some(Self::CapacityExceeded),
            1204 => Some(Self::InsufficientBalance),
            1205 => Some(Self::InsufficientStock),
            1206 => Some(Self::InvalidState),
            1207 => Some(Self::PaymentNotConfirmed),
            1300 => Some(Self::Contention),
            1400 => Some(Self::Validation),
            1500 => Some(Self::Storage),
            1501 => Some(Self::Serialization),
            1502 => Some(Self::Internal),
            _ => None,
        }
    }

    /// Whether this error is retryable.
    ///
    /// Retryable errors may succeed on a subsequent attempt without any
    /// corrective action; everything else needs a changed request or a
    /// changed world first.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Contention | Self::Storage)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Top-level error type for platform operations.
///
/// Every mutating endpoint either fully succeeds (all invariants hold) or
/// fully fails with one of these variants and no partial state change.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CoreError {
    /// User not found.
    #[snafu(display("User {user_id} not found"))]
    UserNotFound {
        /// User identifier.
        user_id: UserId,
    },

    /// Campaign not found.
    #[snafu(display("Campaign {campaign_id} not found"))]
    CampaignNotFound {
        /// Campaign identifier.
        campaign_id: CampaignId,
    },

    /// Order not found.
    #[snafu(display("Order {order_id} not found"))]
    OrderNotFound {
        /// Order identifier.
        order_id: OrderId,
    },

    /// Store item not found.
    #[snafu(display("Store item {item_id} not found"))]
    ItemNotFound {
        /// Item identifier.
        item_id: ItemId,
    },

    /// Report not found.
    #[snafu(display("Report {report_id} not found"))]
    ReportNotFound {
        /// Report identifier.
        report_id: ReportId,
    },

    /// Campaign phase disallows the requested participation action.
    #[snafu(display("Campaign {campaign_id} is {status}, action not allowed"))]
    CampaignNotActive {
        /// Campaign identifier.
        campaign_id: CampaignId,
        /// Phase that blocked the action.
        status: CampaignStatus,
    },

    /// The user is already a participant.
    #[snafu(display("User {user_id} already joined campaign {campaign_id}"))]
    AlreadyJoined {
        /// Campaign identifier.
        campaign_id: CampaignId,
        /// User identifier.
        user_id: UserId,
    },

    /// The user is not a participant.
    #[snafu(display("User {user_id} is not a participant of campaign {campaign_id}"))]
    NotAParticipant {
        /// Campaign identifier.
        campaign_id: CampaignId,
        /// User identifier.
        user_id: UserId,
    },

    /// The participant set is at capacity.
    #[snafu(display("Campaign {campaign_id} has reached its maximum of {max_participants} participants"))]
    CapacityExceeded {
        /// Campaign identifier.
        campaign_id: CampaignId,
        /// Configured capacity.
        max_participants: u32,
    },

    /// The debit would drive the user's balance below zero.
    #[snafu(display("Insufficient balance: required {required}, available {available}"))]
    InsufficientBalance {
        /// Points the operation needed.
        required: i64,
        /// Points the user actually has.
        available: i64,
    },

    /// The requested quantity exceeds the item's stock.
    #[snafu(display("Insufficient stock for item {item_id}: requested {requested}, available {available}"))]
    InsufficientStock {
        /// Item identifier.
        item_id: ItemId,
        /// Units requested.
        requested: u32,
        /// Units in stock.
        available: u32,
    },

    /// Operation not legal in the order's current state (e.g. cancelling a
    /// non-Pending order).
    #[snafu(display("Order {order_id} is {status}, cannot {action}"))]
    InvalidOrderState {
        /// Order identifier.
        order_id: OrderId,
        /// Current order status.
        status: OrderStatus,
        /// The rejected action.
        action: String,
    },

    /// Operation not legal in the entity's current state.
    #[snafu(display("{entity} is in state {state}, cannot {action}"))]
    InvalidState {
        /// Entity description (e.g. `campaign:7`).
        entity: String,
        /// Current state name.
        state: String,
        /// The rejected action.
        action: String,
    },

    /// Paid campaign action attempted before the payment gate confirmed.
    #[snafu(display("Campaign {campaign_id} requires a confirmed payment"))]
    PaymentNotConfirmed {
        /// Campaign identifier.
        campaign_id: CampaignId,
    },

    /// Write transaction retries exhausted. Safe to retry from the client.
    #[snafu(display("Transaction contention: gave up after {attempts} attempts"))]
    Contention {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Malformed input.
    #[snafu(display("Validation error: {message}"))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Storage layer error.
    #[snafu(display("Storage error at {location}: {message}"))]
    Storage {
        /// Error description.
        message: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// Serialization or deserialization error (postcard codec failure).
    #[snafu(display("Serialization error at {location}: {message}"))]
    Serialization {
        /// Error description.
        message: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// Internal error (unexpected state, invariant violation).
    #[snafu(display("Internal error at {location}: {message}"))]
    Internal {
        /// Error description.
        message: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

impl CoreError {
    /// Returns the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UserNotFound { .. } => ErrorCode::UserNotFound,
            Self::CampaignNotFound { .. } => ErrorCode::CampaignNotFound,
            Self::OrderNotFound { .. } => ErrorCode::OrderNotFound,
            Self::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            Self::ReportNotFound { .. } => ErrorCode::ReportNotFound,
            Self::CampaignNotActive { .. } => ErrorCode::CampaignNotActive,
            Self::AlreadyJoined { .. } => ErrorCode::AlreadyJoined,
            Self::NotAParticipant { .. } => ErrorCode::NotAParticipant,
            Self::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            Self::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            Self::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            Self::InvalidOrderState { .. } | Self::InvalidState { .. } => ErrorCode::InvalidState,
            Self::PaymentNotConfirmed { .. } => ErrorCode::PaymentNotConfirmed,
            Self::Contention { .. } => ErrorCode::Contention,
            Self::Validation { .. } => ErrorCode::Validation,
            Self::Storage { .. } => ErrorCode::Storage,
            Self::Serialization { .. } => ErrorCode::Serialization,
            Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Whether this error is retryable.
    ///
    /// Delegates to [`ErrorCode::is_retryable`] so the classification stays
    /// consistent with the numeric code surface.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}
