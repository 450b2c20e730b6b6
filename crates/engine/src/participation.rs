//! The participation manager.
//!
//! Join and leave run inside a single write transaction, so the capacity
//! check, the participant append, and the user's back-reference update are
//! one atomic unit. With the store's single-writer model, concurrent joins
//! against the last open slot serialize and at most `max_participants`
//! memberships ever exist.

use chrono::{DateTime, Utc};
use clearstream_store::WriteTransaction;
use clearstream_types::{
    config::ParticipationConfig, CampaignId, CampaignStatus, CoreError, Participant, Result,
    UserId,
};

use crate::{lifecycle, repo};

/// Adds a user to a campaign's participant set.
///
/// # Errors
///
/// - `CampaignNotFound` / `UserNotFound`.
/// - `CampaignNotActive` if the campaign is Finished, or Upcoming while
///   `cfg.allow_upcoming_join` is off.
/// - `PaymentNotConfirmed` for a paid campaign whose gate has not cleared.
/// - `AlreadyJoined` if the user is in the participant set.
/// - `CapacityExceeded` if the set is full.
pub fn join(
    txn: &mut WriteTransaction<'_>,
    campaign_id: CampaignId,
    user_id: UserId,
    now: DateTime<Utc>,
    cfg: &ParticipationConfig,
) -> Result<()> {
    let mut campaign = repo::load_campaign(txn, campaign_id)?;
    lifecycle::advance(&mut campaign, now);
    match campaign.status {
        CampaignStatus::Finished => {
            return Err(CoreError::CampaignNotActive { campaign_id, status: campaign.status });
        },
        CampaignStatus::Upcoming if !cfg.allow_upcoming_join => {
            return Err(CoreError::CampaignNotActive { campaign_id, status: campaign.status });
        },
        _ => {},
    }
    if campaign.requires_payment() {
        return Err(CoreError::PaymentNotConfirmed { campaign_id });
    }
    if campaign.participant(user_id).is_some() {
        return Err(CoreError::AlreadyJoined { campaign_id, user_id });
    }
    if campaign.is_full() {
        return Err(CoreError::CapacityExceeded {
            campaign_id,
            max_participants: campaign.max_participants,
        });
    }

    let mut user = repo::load_user(txn, user_id)?;
    campaign.participants.push(Participant { user: user_id, joined_at: now, eligible: true });
    user.add_campaign_ref(campaign_id);
    repo::store_campaign(txn, &campaign)?;
    repo::store_user(txn, &user)?;
    tracing::info!(
        campaign = %campaign_id,
        user = %user_id,
        participants = campaign.participants.len(),
        "user joined campaign"
    );
    Ok(())
}

/// Removes a user from a campaign, or marks the membership ineligible.
///
/// When `cfg.ineligible_leave_window` is set and the user leaves within that
/// window of joining, the participant entry is retained with
/// `eligible = false` (fixed at leave time) so a quick join-and-leave earns
/// nothing. Otherwise the entry is removed. The user's back-reference is
/// removed in both cases.
///
/// # Errors
///
/// - `CampaignNotFound` / `UserNotFound`.
/// - `CampaignNotActive` if the campaign is Finished.
/// - `NotAParticipant` if the user is not in the participant set.
pub fn leave(
    txn: &mut WriteTransaction<'_>,
    campaign_id: CampaignId,
    user_id: UserId,
    now: DateTime<Utc>,
    cfg: &ParticipationConfig,
) -> Result<()> {
    let mut campaign = repo::load_campaign(txn, campaign_id)?;
    lifecycle::advance(&mut campaign, now);
    if campaign.status == CampaignStatus::Finished {
        return Err(CoreError::CampaignNotActive { campaign_id, status: campaign.status });
    }
    let Some(participant) = campaign.participant(user_id) else {
        return Err(CoreError::NotAParticipant { campaign_id, user_id });
    };

    let within_window = cfg.ineligible_leave_window.is_some_and(|window| {
        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
        now - participant.joined_at <= window
    });
    if within_window {
        if let Some(entry) = campaign.participant_mut(user_id) {
            entry.eligible = false;
        }
        tracing::info!(campaign = %campaign_id, user = %user_id, "early leave, membership kept ineligible");
    } else {
        campaign.participants.retain(|p| p.user != user_id);
        tracing::info!(campaign = %campaign_id, user = %user_id, "user left campaign");
    }

    let mut user = repo::load_user(txn, user_id)?;
    user.remove_campaign_ref(campaign_id);
    repo::store_campaign(txn, &campaign)?;
    repo::store_user(txn, &user)?;
    Ok(())
}
