//! Campaign CRUD and the payment gate.
//!
//! Creation enforces the per-creator limit on concurrent campaigns, edits
//! honor the status floor and the current participant count, and deletion is
//! restricted to campaigns that have not started.

use chrono::{DateTime, Utc};
use clearstream_store::WriteTransaction;
use clearstream_types::{
    config::ParticipationConfig, error::ValidationSnafu, Campaign, CampaignId, CampaignStatus,
    CoreError, Result, UserId,
};

use crate::{lifecycle, repo};

/// Creator-provided fields of a new campaign.
#[derive(Debug, Clone, bon::Builder)]
pub struct CampaignDraft {
    /// Campaign title.
    pub name: String,
    /// Free-form description.
    #[builder(default)]
    pub description: String,
    /// Start of the active window.
    pub start_date: DateTime<Utc>,
    /// End of the active window.
    pub end_date: DateTime<Utc>,
    /// Capacity. Must be at least 1.
    pub max_participants: u32,
    /// Whether joining requires a confirmed payment.
    #[builder(default)]
    pub is_paid: bool,
}

/// Partial campaign edit; absent fields are left unchanged.
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct CampaignUpdate {
    /// New title.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New window start.
    pub start_date: Option<DateTime<Utc>>,
    /// New window end.
    pub end_date: Option<DateTime<Utc>>,
    /// New capacity; cannot go below the current participant count.
    pub max_participants: Option<u32>,
}

/// Creates a campaign after validating dates, capacity, and the creator's
/// concurrent-campaign limit.
///
/// Paid campaigns start with the payment gate closed; see
/// [`confirm_payment`].
///
/// # Errors
///
/// - `UserNotFound` for an unknown creator.
/// - `Validation` for a bad window, zero capacity, an empty name, or a
///   creator already at `cfg.max_active_campaigns_per_creator` non-finished
///   campaigns.
pub fn create_campaign(
    txn: &mut WriteTransaction<'_>,
    creator: UserId,
    draft: CampaignDraft,
    cfg: &ParticipationConfig,
    now: DateTime<Utc>,
) -> Result<Campaign> {
    lifecycle::validate_window(draft.start_date, draft.end_date)?;
    if draft.max_participants == 0 {
        return ValidationSnafu { message: "max_participants must be at least 1" }.fail();
    }
    if draft.name.trim().is_empty() {
        return ValidationSnafu { message: "campaign name must not be empty" }.fail();
    }
    repo::load_user(txn, creator)?;

    let active = repo::scan_campaigns(txn)?
        .iter()
        .filter(|c| {
            c.creator == creator
                && lifecycle::effective_status(c, now) != CampaignStatus::Finished
        })
        .count();
    if active >= cfg.max_active_campaigns_per_creator as usize {
        return ValidationSnafu {
            message: format!(
                "creator {creator} already has {active} active campaigns (limit {})",
                cfg.max_active_campaigns_per_creator
            ),
        }
        .fail();
    }

    let campaign = Campaign {
        id: CampaignId::new(repo::new_id()?),
        name: draft.name.trim().to_string(),
        description: draft.description,
        creator,
        start_date: draft.start_date,
        end_date: draft.end_date,
        max_participants: draft.max_participants,
        participants: Vec::new(),
        status: lifecycle::phase_at(now, draft.start_date, draft.end_date),
        rewards_distributed: false,
        is_paid: draft.is_paid,
        payment_confirmed: false,
        created_at: now,
    };
    repo::store_campaign(txn, &campaign)?;
    tracing::info!(campaign = %campaign.id, creator = %creator, status = %campaign.status, "campaign created");
    Ok(campaign)
}

/// Applies a partial edit to a campaign.
///
/// The persisted status is a floor: editing dates can advance the phase but
/// never roll it back.
///
/// # Errors
///
/// - `CampaignNotFound`.
/// - `CampaignNotActive` if the campaign is Finished.
/// - `Validation` for a bad window or a capacity below the current
///   participant count.
pub fn update_campaign(
    txn: &mut WriteTransaction<'_>,
    campaign_id: CampaignId,
    update: CampaignUpdate,
    now: DateTime<Utc>,
) -> Result<Campaign> {
    let mut campaign = repo::load_campaign(txn, campaign_id)?;
    if lifecycle::effective_status(&campaign, now) == CampaignStatus::Finished {
        return Err(CoreError::CampaignNotActive {
            campaign_id,
            status: CampaignStatus::Finished,
        });
    }

    let start = update.start_date.unwrap_or(campaign.start_date);
    let end = update.end_date.unwrap_or(campaign.end_date);
    lifecycle::validate_window(start, end)?;
    if let Some(max) = update.max_participants {
        if (max as usize) < campaign.participants.len() {
            return ValidationSnafu {
                message: format!(
                    "max_participants {max} is below the current participant count {}",
                    campaign.participants.len()
                ),
            }
            .fail();
        }
        campaign.max_participants = max;
    }
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return ValidationSnafu { message: "campaign name must not be empty" }.fail();
        }
        campaign.name = name.trim().to_string();
    }
    if let Some(description) = update.description {
        campaign.description = description;
    }
    campaign.start_date = start;
    campaign.end_date = end;
    lifecycle::advance(&mut campaign, now);

    repo::store_campaign(txn, &campaign)?;
    tracing::debug!(campaign = %campaign_id, status = %campaign.status, "campaign updated");
    Ok(campaign)
}

/// Deletes an Upcoming campaign, cleaning up every participant's
/// back-reference in the same transaction.
///
/// # Errors
///
/// - `CampaignNotFound`.
/// - `CampaignNotActive` once the campaign has started.
pub fn delete_campaign(
    txn: &mut WriteTransaction<'_>,
    campaign_id: CampaignId,
    now: DateTime<Utc>,
) -> Result<()> {
    let campaign = repo::load_campaign(txn, campaign_id)?;
    let status = lifecycle::effective_status(&campaign, now);
    if status != CampaignStatus::Upcoming {
        return Err(CoreError::CampaignNotActive { campaign_id, status });
    }

    for participant in &campaign.participants {
        let mut user = repo::load_user(txn, participant.user)?;
        user.remove_campaign_ref(campaign_id);
        repo::store_user(txn, &user)?;
    }
    repo::remove_campaign(txn, campaign_id);
    tracing::info!(campaign = %campaign_id, "campaign deleted");
    Ok(())
}

/// Records the external payment gate for a paid campaign.
///
/// # Errors
///
/// - `CampaignNotFound`.
/// - `Validation` for a free campaign.
pub fn confirm_payment(
    txn: &mut WriteTransaction<'_>,
    campaign_id: CampaignId,
) -> Result<Campaign> {
    let mut campaign = repo::load_campaign(txn, campaign_id)?;
    if !campaign.is_paid {
        return ValidationSnafu {
            message: format!("campaign {campaign_id} is free and has no payment to confirm"),
        }
        .fail();
    }
    campaign.payment_confirmed = true;
    repo::store_campaign(txn, &campaign)?;
    tracing::info!(campaign = %campaign_id, "campaign payment confirmed");
    Ok(campaign)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::Duration;
    use clearstream_store::Database;
    use clearstream_test_utils::fixtures;
    use clearstream_types::{config::ParticipationConfig, Participant};

    use super::*;

    fn db_with_user(id: i64) -> Database {
        let db = Database::new();
        let mut txn = db.write().expect("write txn");
        repo::store_user(&mut txn, &fixtures::user(id)).expect("store user");
        txn.commit();
        db
    }

    fn active_draft() -> CampaignDraft {
        let now = Utc::now();
        CampaignDraft::builder()
            .name("River cleanup".to_string())
            .start_date(now - Duration::hours(1))
            .end_date(now + Duration::hours(1))
            .max_participants(10)
            .build()
    }

    #[test]
    fn test_create_campaign_derives_status() {
        let db = db_with_user(1);
        let cfg = ParticipationConfig::default();

        let mut txn = db.write().expect("write txn");
        let campaign =
            create_campaign(&mut txn, UserId::new(1), active_draft(), &cfg, Utc::now())
                .expect("create");
        txn.commit();

        assert_eq!(campaign.status, CampaignStatus::Active);
        assert!(!campaign.rewards_distributed);
        assert_eq!(
            repo::load_campaign(&db.read(), campaign.id).expect("load").name,
            "River cleanup"
        );
    }

    #[test]
    fn test_create_campaign_validation() {
        let db = db_with_user(1);
        let cfg = ParticipationConfig::default();
        let now = Utc::now();
        let mut txn = db.write().expect("write txn");

        let backwards = CampaignDraft::builder()
            .name("Backwards".to_string())
            .start_date(now + Duration::hours(1))
            .end_date(now)
            .max_participants(10)
            .build();
        assert!(matches!(
            create_campaign(&mut txn, UserId::new(1), backwards, &cfg, now).unwrap_err(),
            CoreError::Validation { .. }
        ));

        let zero_capacity = CampaignDraft::builder()
            .name("Zero".to_string())
            .start_date(now)
            .end_date(now + Duration::hours(1))
            .max_participants(0)
            .build();
        assert!(matches!(
            create_campaign(&mut txn, UserId::new(1), zero_capacity, &cfg, now).unwrap_err(),
            CoreError::Validation { .. }
        ));
    }

    #[test]
    fn test_per_creator_active_campaign_limit() {
        let db = db_with_user(1);
        let cfg = ParticipationConfig::default();

        let mut txn = db.write().expect("write txn");
        for _ in 0..3 {
            create_campaign(&mut txn, UserId::new(1), active_draft(), &cfg, Utc::now())
                .expect("create");
        }
        let err = create_campaign(&mut txn, UserId::new(1), active_draft(), &cfg, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn test_finished_campaigns_do_not_count_against_the_limit() {
        let db = db_with_user(1);
        let cfg = ParticipationConfig::default();

        let mut txn = db.write().expect("write txn");
        for id in [10, 11, 12] {
            repo::store_campaign(&mut txn, &fixtures::finished_campaign(id, UserId::new(1), 5))
                .expect("store");
        }
        create_campaign(&mut txn, UserId::new(1), active_draft(), &cfg, Utc::now())
            .expect("finished campaigns are not active");
    }

    #[test]
    fn test_update_cannot_shrink_below_participants() {
        let db = db_with_user(1);
        let mut campaign = fixtures::active_campaign(5, UserId::new(1), 10);
        for i in 0..3 {
            campaign.participants.push(Participant {
                user: UserId::new(100 + i),
                joined_at: Utc::now(),
                eligible: true,
            });
        }
        let mut txn = db.write().expect("write txn");
        repo::store_campaign(&mut txn, &campaign).expect("store");

        let err = update_campaign(
            &mut txn,
            campaign.id,
            CampaignUpdate::builder().max_participants(2).build(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));

        let updated = update_campaign(
            &mut txn,
            campaign.id,
            CampaignUpdate::builder().max_participants(3).build(),
            Utc::now(),
        )
        .expect("shrink to exactly the participant count");
        assert_eq!(updated.max_participants, 3);
    }

    #[test]
    fn test_update_rejected_on_finished_campaign() {
        let db = db_with_user(1);
        let campaign = fixtures::finished_campaign(5, UserId::new(1), 10);
        let mut txn = db.write().expect("write txn");
        repo::store_campaign(&mut txn, &campaign).expect("store");

        let err = update_campaign(
            &mut txn,
            campaign.id,
            CampaignUpdate::builder().name("Renamed".to_string()).build(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::CampaignNotActive { .. }));
    }

    #[test]
    fn test_update_dates_cannot_regress_status() {
        let db = db_with_user(1);
        let campaign = fixtures::active_campaign(5, UserId::new(1), 10);
        let now = Utc::now();
        let mut txn = db.write().expect("write txn");
        repo::store_campaign(&mut txn, &campaign).expect("store");

        // Push the window into the future; the phase stays Active.
        let updated = update_campaign(
            &mut txn,
            campaign.id,
            CampaignUpdate::builder()
                .start_date(now + Duration::days(1))
                .end_date(now + Duration::days(2))
                .build(),
            now,
        )
        .expect("update");
        assert_eq!(updated.status, CampaignStatus::Active);
    }

    #[test]
    fn test_delete_upcoming_cleans_back_references() {
        let db = db_with_user(1);
        let mut campaign = fixtures::upcoming_campaign(5, UserId::new(1), 10);
        campaign.participants.push(Participant {
            user: UserId::new(2),
            joined_at: Utc::now(),
            eligible: true,
        });
        let mut member = fixtures::user(2);
        member.add_campaign_ref(campaign.id);

        let mut txn = db.write().expect("write txn");
        repo::store_campaign(&mut txn, &campaign).expect("store");
        repo::store_user(&mut txn, &member).expect("store");
        delete_campaign(&mut txn, campaign.id, Utc::now()).expect("delete");
        txn.commit();

        let read = db.read();
        assert!(repo::load_campaign(&read, campaign.id).is_err());
        assert!(!repo::load_user(&read, UserId::new(2)).expect("load").has_campaign_ref(campaign.id));
    }

    #[test]
    fn test_delete_started_campaign_rejected() {
        let db = db_with_user(1);
        let campaign = fixtures::active_campaign(5, UserId::new(1), 10);
        let mut txn = db.write().expect("write txn");
        repo::store_campaign(&mut txn, &campaign).expect("store");

        let err = delete_campaign(&mut txn, campaign.id, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CampaignNotActive { status: CampaignStatus::Active, .. }
        ));
    }

    #[test]
    fn test_confirm_payment() {
        let db = db_with_user(1);
        let mut campaign = fixtures::upcoming_campaign(5, UserId::new(1), 10);
        campaign.is_paid = true;
        let mut txn = db.write().expect("write txn");
        repo::store_campaign(&mut txn, &campaign).expect("store");

        let confirmed = confirm_payment(&mut txn, campaign.id).expect("confirm");
        assert!(confirmed.payment_confirmed);

        let free = fixtures::upcoming_campaign(6, UserId::new(1), 10);
        repo::store_campaign(&mut txn, &free).expect("store");
        assert!(matches!(
            confirm_payment(&mut txn, free.id).unwrap_err(),
            CoreError::Validation { .. }
        ));
    }
}
