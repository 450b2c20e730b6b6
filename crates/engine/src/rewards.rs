//! The reward distribution engine.
//!
//! Runs when a campaign reaches Finished. The `rewards_distributed` flag is
//! checked and flipped inside the same write transaction as every credit, so
//! a campaign's rewards are paid exactly once no matter how many sweeps race
//! over it.

use chrono::{DateTime, Utc};
use clearstream_store::WriteTransaction;
use clearstream_types::{config::RewardConfig, Campaign, PointSource, Result, UserId};

use crate::ledger;

/// Credits completion rewards for a finished campaign.
///
/// Credits the creator `min(cfg.creator_cap, eligible * rate)` and every
/// eligible participant `cfg.participant_reward`, then sets
/// `rewards_distributed` on the in-memory campaign. The caller persists the
/// campaign in the same transaction.
///
/// Returns `false` (and does nothing) when rewards were already distributed.
///
/// # Errors
///
/// Any credit failure aborts the whole distribution: the campaign flag stays
/// unset and the caller must drop the transaction.
pub fn distribute(
    txn: &mut WriteTransaction<'_>,
    campaign: &mut Campaign,
    cfg: &RewardConfig,
    now: DateTime<Utc>,
) -> Result<bool> {
    if campaign.rewards_distributed {
        return Ok(false);
    }

    let eligible: Vec<UserId> =
        campaign.eligible_participants().iter().map(|p| p.user).collect();
    let creator_reward = std::cmp::min(
        cfg.creator_cap,
        eligible.len() as i64 * cfg.per_participant_creator_rate,
    );

    if creator_reward > 0 {
        ledger::credit(
            txn,
            campaign.creator,
            creator_reward,
            format!("Reward for hosting campaign '{}'", campaign.name),
            PointSource::CampaignReward,
            Some(campaign.id.value()),
            now,
        )?;
    }
    if cfg.participant_reward > 0 {
        for user in &eligible {
            ledger::credit(
                txn,
                *user,
                cfg.participant_reward,
                format!("Reward for completing campaign '{}'", campaign.name),
                PointSource::CampaignReward,
                Some(campaign.id.value()),
                now,
            )?;
        }
    }

    campaign.rewards_distributed = true;
    tracing::info!(
        campaign = %campaign.id,
        eligible = eligible.len(),
        creator_reward,
        participant_reward = cfg.participant_reward,
        "campaign rewards distributed"
    );
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use clearstream_store::Database;
    use clearstream_test_utils::fixtures;
    use clearstream_types::Participant;

    use super::*;
    use crate::repo;

    fn finished_with_participants(eligible: usize, ineligible: usize) -> (Database, Campaign) {
        let db = Database::new();
        let creator = UserId::new(1);
        let mut campaign = fixtures::finished_campaign(100, creator, 64);
        let now = Utc::now();

        let mut txn = db.write().expect("write txn");
        repo::store_user(&mut txn, &fixtures::user(1)).expect("store creator");
        for i in 0..(eligible + ineligible) {
            let user_id = UserId::new(10 + i as i64);
            repo::store_user(&mut txn, &fixtures::user(user_id.value())).expect("store user");
            campaign.participants.push(Participant {
                user: user_id,
                joined_at: now,
                eligible: i < eligible,
            });
        }
        repo::store_campaign(&mut txn, &campaign).expect("store campaign");
        txn.commit();
        (db, campaign)
    }

    #[test]
    fn test_distribution_credits_creator_and_eligible_participants() {
        let (db, mut campaign) = finished_with_participants(10, 2);
        let cfg = RewardConfig::default();

        let mut txn = db.write().expect("write txn");
        let did = distribute(&mut txn, &mut campaign, &cfg, Utc::now()).expect("distribute");
        assert!(did);
        repo::store_campaign(&mut txn, &campaign).expect("store");
        txn.commit();

        let read = db.read();
        // 10 eligible at rate 2 under cap 200 => creator +20.
        assert_eq!(ledger::balance(&read, UserId::new(1)).expect("creator"), 20);
        for i in 0..10 {
            assert_eq!(
                ledger::balance(&read, UserId::new(10 + i)).expect("participant"),
                cfg.participant_reward
            );
        }
        // Ineligible members get nothing.
        assert_eq!(ledger::balance(&read, UserId::new(20)).expect("ineligible"), 0);
        assert_eq!(ledger::balance(&read, UserId::new(21)).expect("ineligible"), 0);
        assert!(repo::load_campaign(&read, campaign.id).expect("load").rewards_distributed);
    }

    #[test]
    fn test_distribution_is_idempotent() {
        let (db, mut campaign) = finished_with_participants(3, 0);
        let cfg = RewardConfig::default();

        let mut txn = db.write().expect("write txn");
        assert!(distribute(&mut txn, &mut campaign, &cfg, Utc::now()).expect("first"));
        repo::store_campaign(&mut txn, &campaign).expect("store");
        txn.commit();

        let mut txn = db.write().expect("write txn");
        let mut reloaded = repo::load_campaign(&txn, campaign.id).expect("load");
        assert!(!distribute(&mut txn, &mut reloaded, &cfg, Utc::now()).expect("second"));
        txn.commit();

        let read = db.read();
        assert_eq!(ledger::balance(&read, UserId::new(1)).expect("creator"), 6);
        assert_eq!(ledger::balance(&read, UserId::new(10)).expect("participant"), 10);
    }

    #[test]
    fn test_creator_reward_is_capped() {
        let (db, mut campaign) = finished_with_participants(8, 0);
        let cfg = RewardConfig::builder()
            .per_participant_creator_rate(100)
            .creator_cap(150)
            .build()
            .expect("config");

        let mut txn = db.write().expect("write txn");
        distribute(&mut txn, &mut campaign, &cfg, Utc::now()).expect("distribute");
        repo::store_campaign(&mut txn, &campaign).expect("store");
        txn.commit();

        assert_eq!(ledger::balance(&db.read(), UserId::new(1)).expect("creator"), 150);
    }

    #[test]
    fn test_no_eligible_participants_still_sets_flag() {
        let (db, mut campaign) = finished_with_participants(0, 2);
        let cfg = RewardConfig::default();

        let mut txn = db.write().expect("write txn");
        assert!(distribute(&mut txn, &mut campaign, &cfg, Utc::now()).expect("distribute"));
        repo::store_campaign(&mut txn, &campaign).expect("store");
        txn.commit();

        let read = db.read();
        assert_eq!(ledger::balance(&read, UserId::new(1)).expect("creator"), 0);
        assert!(repo::load_campaign(&read, campaign.id).expect("load").rewards_distributed);
    }

    #[test]
    fn test_missing_participant_aborts_distribution() {
        let (db, mut campaign) = finished_with_participants(2, 0);
        // A participant whose user document is gone.
        campaign.participants.push(Participant {
            user: UserId::new(999),
            joined_at: Utc::now(),
            eligible: true,
        });
        let mut txn = db.write().expect("write txn");
        repo::store_campaign(&mut txn, &campaign).expect("store");
        txn.commit();

        let cfg = RewardConfig::default();
        let mut txn = db.write().expect("write txn");
        let mut loaded = repo::load_campaign(&txn, campaign.id).expect("load");
        let err = distribute(&mut txn, &mut loaded, &cfg, Utc::now()).unwrap_err();
        assert!(matches!(err, clearstream_types::CoreError::UserNotFound { .. }));
        drop(txn); // abort

        // Nothing committed: balances untouched, flag unset.
        let read = db.read();
        assert_eq!(ledger::balance(&read, UserId::new(1)).expect("creator"), 0);
        assert!(!repo::load_campaign(&read, campaign.id).expect("load").rewards_distributed);
    }
}
