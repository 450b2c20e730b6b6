//! The ClearStream domain engine.
//!
//! Implements the points ledger and campaign-lifecycle core on top of the
//! snapshot-isolated store:
//!
//! - [`ledger`] - the only approved mutation path for user point balances
//! - [`lifecycle`] - the Upcoming -> Active -> Finished state machine
//! - [`participation`] - join/leave with capacity and phase gates
//! - [`rewards`] - idempotent reward distribution at campaign completion
//! - [`redemption`] - store orders with atomic debit, stock, and refund
//! - [`reports`] - pollution report submission and review rewards
//! - [`accounts`] - account creation with the signup bonus
//! - [`campaigns`] - campaign CRUD and the payment gate
//! - [`sweep`] - the periodic lifecycle sweep and its background job
//! - [`service`] - the async facade with bounded transaction retry
//!
//! Every mutating workflow runs inside exactly one write transaction, so a
//! failure at any step leaves no partial state.

#![deny(unsafe_code)]

pub mod accounts;
pub mod campaigns;
pub mod ledger;
pub mod lifecycle;
pub mod participation;
pub mod redemption;
pub mod repo;
pub mod reports;
pub mod rewards;
pub mod service;
pub mod sweep;

pub use service::{CoreService, NotifyEvent, Notifier};
pub use sweep::{run_sweep, SweepJob, SweepOutcome};
