//! The async service facade.
//!
//! [`CoreService`] owns the database and configuration and exposes the
//! platform's operation surface. Every mutating call runs inside one write
//! transaction acquired with bounded retry: a busy writer slot is retried
//! with a short backoff, and exhaustion surfaces [`CoreError::Contention`],
//! which the client may safely retry.
//!
//! Notification dispatch is a fire-and-forget hook: it runs only after the
//! transaction commits, and a failing notifier is logged at `warn` without
//! affecting the committed result.

use std::sync::Arc;

use chrono::Utc;
use clearstream_store::{Database, StoreError, WriteTransaction};
use clearstream_types::{
    config::{ParticipationConfig, RetryConfig, RewardConfig},
    Campaign, CampaignId, CoreError, LedgerEntry, Order, OrderId, OrderStatus, Report, ReportId,
    ReportStatus, Result, User, UserId,
};
use tracing::warn;

use crate::{
    accounts, campaigns,
    campaigns::{CampaignDraft, CampaignUpdate},
    ledger, participation,
    redemption::{self, OrderLineRequest},
    repo,
    reports::{self, ReportDraft, SubmissionGates},
    sweep::{self, SweepOutcome},
};

/// Domain events published after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    /// A new account was created.
    UserCreated { user: UserId },
    /// A user joined a campaign.
    CampaignJoined { campaign: CampaignId, user: UserId },
    /// A user left a campaign.
    CampaignLeft { campaign: CampaignId, user: UserId },
    /// A store order was placed.
    OrderCreated { order: OrderId, user: UserId },
    /// A store order was cancelled and refunded.
    OrderCancelled { order: OrderId, user: UserId },
    /// A report moved through review.
    ReportReviewed { report: ReportId, user: UserId, status: ReportStatus },
}

/// Outbound notification hook (email, push, webhooks — all external).
///
/// Called after commit; a returned error is logged and otherwise ignored, so
/// a flaky notification channel can never roll back or fail an operation.
pub trait Notifier: Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Implementations may fail; failures are logged by the caller.
    fn notify(
        &self,
        event: &NotifyEvent,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// The platform's operation surface.
#[derive(bon::Builder)]
#[builder(on(_, required))]
pub struct CoreService {
    /// Shared database handle.
    db: Arc<Database>,
    /// Reward amounts.
    #[builder(default)]
    rewards: RewardConfig,
    /// Participation policy knobs.
    #[builder(default)]
    participation: ParticipationConfig,
    /// Write-transaction retry policy.
    #[builder(default)]
    retry: RetryConfig,
    /// Optional notification hook.
    #[builder(default)]
    notifier: Option<Arc<dyn Notifier>>,
}

impl CoreService {
    /// Runs `f` in a write transaction, retrying slot acquisition per the
    /// retry policy, and commits on success.
    async fn with_write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTransaction<'_>) -> Result<T>,
    {
        let mut attempts = 0u32;
        let mut txn = loop {
            attempts += 1;
            match self.db.write() {
                Ok(txn) => break txn,
                Err(StoreError::Busy { .. }) if attempts < self.retry.max_attempts => {
                    tokio::time::sleep(self.retry.backoff).await;
                },
                Err(StoreError::Busy { .. }) => {
                    return Err(CoreError::Contention { attempts });
                },
            }
        };
        let value = f(&mut txn)?;
        txn.commit();
        Ok(value)
    }

    /// Fire-and-forget event dispatch; runs after commit only.
    fn emit(&self, event: NotifyEvent) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(&event) {
                warn!(error = %e, ?event, "notification dispatch failed");
            }
        }
    }

    /// Creates a user account with the signup bonus.
    pub async fn create_user(&self, name: &str, email: &str) -> Result<User> {
        let user = self
            .with_write(|txn| accounts::create_user(txn, name, email, &self.rewards, Utc::now()))
            .await?;
        self.emit(NotifyEvent::UserCreated { user: user.id });
        Ok(user)
    }

    /// Creates a campaign.
    pub async fn create_campaign(
        &self,
        creator: UserId,
        draft: CampaignDraft,
    ) -> Result<Campaign> {
        self.with_write(|txn| {
            campaigns::create_campaign(txn, creator, draft, &self.participation, Utc::now())
        })
        .await
    }

    /// Applies a partial campaign edit.
    pub async fn update_campaign(
        &self,
        campaign_id: CampaignId,
        update: CampaignUpdate,
    ) -> Result<Campaign> {
        self.with_write(|txn| campaigns::update_campaign(txn, campaign_id, update, Utc::now()))
            .await
    }

    /// Deletes an Upcoming campaign.
    pub async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<()> {
        self.with_write(|txn| campaigns::delete_campaign(txn, campaign_id, Utc::now())).await
    }

    /// Records the external payment confirmation for a paid campaign.
    pub async fn confirm_campaign_payment(&self, campaign_id: CampaignId) -> Result<Campaign> {
        self.with_write(|txn| campaigns::confirm_payment(txn, campaign_id)).await
    }

    /// Adds a user to a campaign.
    pub async fn join_campaign(&self, campaign_id: CampaignId, user_id: UserId) -> Result<()> {
        self.with_write(|txn| {
            participation::join(txn, campaign_id, user_id, Utc::now(), &self.participation)
        })
        .await?;
        self.emit(NotifyEvent::CampaignJoined { campaign: campaign_id, user: user_id });
        Ok(())
    }

    /// Removes a user from a campaign (or marks the membership ineligible).
    pub async fn leave_campaign(&self, campaign_id: CampaignId, user_id: UserId) -> Result<()> {
        self.with_write(|txn| {
            participation::leave(txn, campaign_id, user_id, Utc::now(), &self.participation)
        })
        .await?;
        self.emit(NotifyEvent::CampaignLeft { campaign: campaign_id, user: user_id });
        Ok(())
    }

    /// Places a store order.
    pub async fn create_order(
        &self,
        user_id: UserId,
        lines: &[OrderLineRequest],
    ) -> Result<Order> {
        let order = self
            .with_write(|txn| redemption::create_order(txn, user_id, lines, Utc::now()))
            .await?;
        self.emit(NotifyEvent::OrderCreated { order: order.id, user: user_id });
        Ok(order)
    }

    /// Cancels a Pending order with a full refund.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        let order =
            self.with_write(|txn| redemption::cancel_order(txn, order_id, Utc::now())).await?;
        self.emit(NotifyEvent::OrderCancelled { order: order.id, user: order.user });
        Ok(order)
    }

    /// Advances an order's fulfilment state.
    pub async fn set_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order> {
        self.with_write(|txn| redemption::set_order_status(txn, order_id, new_status, Utc::now()))
            .await
    }

    /// Submits a screened pollution report.
    pub async fn submit_report(
        &self,
        user_id: UserId,
        draft: ReportDraft,
        gates: SubmissionGates,
    ) -> Result<Report> {
        self.with_write(|txn| {
            reports::submit_report(txn, user_id, draft, gates, &self.rewards, Utc::now())
        })
        .await
    }

    /// Moves a report through review.
    pub async fn review_report(
        &self,
        report_id: ReportId,
        new_status: ReportStatus,
    ) -> Result<Report> {
        let report = self
            .with_write(|txn| {
                reports::review_report(txn, report_id, new_status, &self.rewards, Utc::now())
            })
            .await?;
        self.emit(NotifyEvent::ReportReviewed {
            report: report.id,
            user: report.user,
            status: report.status,
        });
        Ok(report)
    }

    /// Runs one lifecycle sweep pass.
    pub fn run_sweep(&self) -> SweepOutcome {
        sweep::run_sweep(&self.db, &self.rewards, Utc::now())
    }

    /// Current point balance of a user.
    pub fn balance(&self, user_id: UserId) -> Result<i64> {
        ledger::balance(&self.db.read(), user_id)
    }

    /// A page of the user's ledger history, newest first.
    pub fn history(&self, user_id: UserId, offset: usize, limit: usize) -> Result<Vec<LedgerEntry>> {
        ledger::history(&self.db.read(), user_id, offset, limit)
    }

    /// Loads a user document.
    pub fn get_user(&self, user_id: UserId) -> Result<User> {
        repo::load_user(&self.db.read(), user_id)
    }

    /// Loads a campaign document.
    pub fn get_campaign(&self, campaign_id: CampaignId) -> Result<Campaign> {
        repo::load_campaign(&self.db.read(), campaign_id)
    }

    /// All campaigns in id order.
    pub fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        repo::scan_campaigns(&self.db.read())
    }
}
