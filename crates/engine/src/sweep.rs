//! The periodic campaign lifecycle sweep.
//!
//! Each pass scans the campaigns from a read snapshot and gives every
//! non-settled campaign its own write transaction: the phase is advanced and,
//! on the edge into Finished, rewards are distributed. Per-campaign failures
//! are logged and do not block the rest of the pass.
//!
//! The sweep is safe to run concurrently with itself: each transaction
//! re-reads the campaign and the `rewards_distributed` check happens inside
//! it, so double-crediting is impossible.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use chrono::{DateTime, Utc};
use clearstream_store::Database;
use clearstream_types::{
    config::{RewardConfig, SweepConfig},
    Campaign, CampaignId, CampaignStatus, CoreError, Result,
};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::{lifecycle, repo, rewards};

/// Tally of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Campaigns whose persisted phase advanced.
    pub advanced: usize,
    /// Campaigns whose rewards were distributed this pass.
    pub distributed: usize,
    /// Campaigns whose transaction failed (logged and skipped).
    pub failed: usize,
}

/// Whether a campaign still needs sweep attention.
fn needs_sweep(campaign: &Campaign, now: DateTime<Utc>) -> bool {
    let effective = lifecycle::effective_status(campaign, now);
    effective != campaign.status
        || (effective == CampaignStatus::Finished && !campaign.rewards_distributed)
}

/// Runs one sweep pass over all campaigns.
pub fn run_sweep(db: &Database, cfg: &RewardConfig, now: DateTime<Utc>) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();
    let campaigns = match repo::scan_campaigns(&db.read()) {
        Ok(campaigns) => campaigns,
        Err(e) => {
            warn!(error = %e, "sweep could not scan campaigns");
            outcome.failed += 1;
            return outcome;
        },
    };

    for campaign in campaigns.iter().filter(|c| needs_sweep(c, now)) {
        match sweep_one(db, campaign.id, cfg, now) {
            Ok((advanced, distributed)) => {
                outcome.advanced += usize::from(advanced);
                outcome.distributed += usize::from(distributed);
            },
            Err(e) => {
                warn!(campaign = %campaign.id, error = %e, "sweep failed for campaign");
                outcome.failed += 1;
            },
        }
    }
    debug!(
        advanced = outcome.advanced,
        distributed = outcome.distributed,
        failed = outcome.failed,
        "sweep pass complete"
    );
    outcome
}

/// Advances and settles a single campaign in its own transaction.
fn sweep_one(
    db: &Database,
    campaign_id: CampaignId,
    cfg: &RewardConfig,
    now: DateTime<Utc>,
) -> Result<(bool, bool)> {
    let mut txn = db.write().map_err(|_| CoreError::Contention { attempts: 1 })?;
    // Re-read inside the transaction; the snapshot copy may be stale.
    let mut campaign = match repo::load_campaign(&txn, campaign_id) {
        Ok(campaign) => campaign,
        Err(CoreError::CampaignNotFound { .. }) => return Ok((false, false)),
        Err(e) => return Err(e),
    };

    let advanced = lifecycle::advance(&mut campaign, now);
    let mut distributed = false;
    if campaign.status == CampaignStatus::Finished && !campaign.rewards_distributed {
        distributed = rewards::distribute(&mut txn, &mut campaign, cfg, now)?;
    }
    if advanced || distributed {
        repo::store_campaign(&mut txn, &campaign)?;
        txn.commit();
    }
    Ok((advanced, distributed))
}

/// Background job driving [`run_sweep`] on a fixed interval.
///
/// Built in the platform's background-job idiom: a builder with defaults, an
/// optional watchdog heartbeat bumped each cycle, and a `start` that returns
/// the task handle for shutdown via abort.
#[derive(bon::Builder)]
#[builder(on(_, required))]
pub struct SweepJob {
    /// Shared database handle.
    db: Arc<Database>,
    /// Reward amounts for distribution.
    #[builder(default)]
    rewards: RewardConfig,
    /// Interval between passes.
    #[builder(default = SweepConfig::default().interval)]
    interval: Duration,
    /// Watchdog heartbeat handle. Updated each cycle to prove liveness.
    #[builder(default)]
    watchdog_handle: Option<Arc<AtomicU64>>,
}

impl SweepJob {
    /// Starts the sweep background task.
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            info!(interval = ?self.interval, "campaign sweep started");

            loop {
                ticker.tick().await;
                self.heartbeat();
                let outcome = run_sweep(&self.db, &self.rewards, Utc::now());
                if outcome.failed > 0 {
                    warn!(failed = outcome.failed, "sweep pass had failures");
                }
            }
        })
    }

    /// Updates the watchdog heartbeat counter.
    fn heartbeat(&self) {
        if let Some(ref handle) = self.watchdog_handle {
            handle.fetch_add(1, Ordering::Relaxed);
        }
    }
}
