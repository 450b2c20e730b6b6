//! The campaign lifecycle state machine.
//!
//! A campaign's phase is derived from its date window, but the persisted
//! status acts as a floor: once a later phase has been observed and stored,
//! editing the dates can never roll the campaign back to an earlier phase.

use chrono::{DateTime, Utc};
use clearstream_types::{error::ValidationSnafu, Campaign, CampaignStatus, Result};

/// Phase implied by the date window alone.
#[must_use]
pub fn phase_at(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> CampaignStatus {
    if now < start {
        CampaignStatus::Upcoming
    } else if now <= end {
        CampaignStatus::Active
    } else {
        CampaignStatus::Finished
    }
}

/// Effective phase: the derived phase clamped forward by the persisted floor.
#[must_use]
pub fn effective_status(campaign: &Campaign, now: DateTime<Utc>) -> CampaignStatus {
    let derived = phase_at(now, campaign.start_date, campaign.end_date);
    if derived.rank() >= campaign.status.rank() {
        derived
    } else {
        campaign.status
    }
}

/// Advances the persisted status to the effective phase.
///
/// Returns whether the status changed. Never regresses.
pub fn advance(campaign: &mut Campaign, now: DateTime<Utc>) -> bool {
    let next = effective_status(campaign, now);
    if next == campaign.status {
        return false;
    }
    campaign.status = next;
    true
}

/// Validates a campaign date window.
///
/// # Errors
///
/// `Validation` if `start >= end`.
pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if start >= end {
        return ValidationSnafu {
            message: format!("start_date ({start}) must be before end_date ({end})"),
        }
        .fail();
    }
    Ok(())
}
