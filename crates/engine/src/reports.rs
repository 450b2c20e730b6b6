//! The pollution report workflow.
//!
//! Submission and review each carry a one-time reward. The reward flags live
//! on the report document and are checked and flipped in the same write
//! transaction as the credit, so repeat reviews can never double-credit.
//!
//! Image authenticity scoring and duplicate detection are external
//! collaborators; they reach this module as pre-computed boolean gates.

use chrono::{DateTime, Utc};
use clearstream_store::WriteTransaction;
use clearstream_types::{
    config::RewardConfig, error::ValidationSnafu, GeoPoint, PointSource, Report, ReportId,
    ReportRewards, ReportStatus, Result, Severity, UserId,
};

use crate::{ledger, repo};

/// Submitter-provided fields of a new report.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    /// Where the pollution was observed.
    pub location: GeoPoint,
    /// Free-form description.
    pub description: String,
    /// Severity chosen by the submitter.
    pub severity: Severity,
}

/// Pre-computed verdicts from the external screening collaborators.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionGates {
    /// The attached image passed the authenticity check.
    pub is_authentic: bool,
    /// Another report for the same spot exists within the dedup window.
    pub within_dedup_window: bool,
}

/// Persists a screened report and credits the one-time submission reward.
///
/// # Errors
///
/// - `Validation` if the image failed screening or the report is a
///   duplicate-window hit.
/// - `UserNotFound`.
pub fn submit_report(
    txn: &mut WriteTransaction<'_>,
    user_id: UserId,
    draft: ReportDraft,
    gates: SubmissionGates,
    cfg: &RewardConfig,
    now: DateTime<Utc>,
) -> Result<Report> {
    if !gates.is_authentic {
        return ValidationSnafu { message: "report image failed the authenticity check" }.fail();
    }
    if gates.within_dedup_window {
        return ValidationSnafu {
            message: "a report for this location already exists within the dedup window",
        }
        .fail();
    }
    if draft.description.trim().is_empty() {
        return ValidationSnafu { message: "report description must not be empty" }.fail();
    }

    // Existence check doubles as the reward path when the bonus is nonzero.
    let report_id = ReportId::new(repo::new_id()?);
    if cfg.report_submission_reward > 0 {
        ledger::credit(
            txn,
            user_id,
            cfg.report_submission_reward,
            "Reward for submitting a pollution report",
            PointSource::ReportSubmission,
            Some(report_id.value()),
            now,
        )?;
    } else {
        repo::load_user(txn, user_id)?;
    }

    let report = Report {
        id: report_id,
        user: user_id,
        location: draft.location,
        description: draft.description,
        severity: draft.severity,
        status: ReportStatus::Pending,
        rewards: ReportRewards { submission_rewarded: true, approval_rewarded: false },
        created_at: now,
    };
    repo::store_report(txn, &report)?;
    tracing::info!(report = %report_id, user = %user_id, severity = ?report.severity, "report submitted");
    Ok(report)
}

/// Moves a report through review.
///
/// The first transition to Accepted credits the one-time approval reward in
/// the same transaction; later reviews only change the status.
///
/// # Errors
///
/// - `ReportNotFound`.
/// - `Validation` when trying to move a report back to Pending.
pub fn review_report(
    txn: &mut WriteTransaction<'_>,
    report_id: ReportId,
    new_status: ReportStatus,
    cfg: &RewardConfig,
    now: DateTime<Utc>,
) -> Result<Report> {
    if new_status == ReportStatus::Pending {
        return ValidationSnafu { message: "a report cannot be moved back to pending" }.fail();
    }
    let mut report = repo::load_report(txn, report_id)?;
    report.status = new_status;
    if new_status == ReportStatus::Accepted && !report.rewards.approval_rewarded {
        if cfg.report_approval_reward > 0 {
            ledger::credit(
                txn,
                report.user,
                cfg.report_approval_reward,
                "Reward for an accepted pollution report",
                PointSource::ReportApproval,
                Some(report_id.value()),
                now,
            )?;
        }
        report.rewards.approval_rewarded = true;
    }
    repo::store_report(txn, &report)?;
    tracing::info!(report = %report_id, status = %new_status, "report reviewed");
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use clearstream_store::Database;
    use clearstream_test_utils::fixtures;
    use clearstream_types::CoreError;

    use super::*;

    fn draft() -> ReportDraft {
        ReportDraft {
            location: GeoPoint { longitude: 77.59, latitude: 12.97 },
            description: "oil slick by the pier".to_string(),
            severity: Severity::High,
        }
    }

    const CLEAN: SubmissionGates =
        SubmissionGates { is_authentic: true, within_dedup_window: false };

    fn db_with_user(id: i64) -> Database {
        let db = Database::new();
        let mut txn = db.write().expect("write txn");
        repo::store_user(&mut txn, &fixtures::user(id)).expect("store user");
        txn.commit();
        db
    }

    #[test]
    fn test_submission_credits_once_and_persists() {
        let db = db_with_user(1);
        let cfg = RewardConfig::default();

        let mut txn = db.write().expect("write txn");
        let report =
            submit_report(&mut txn, UserId::new(1), draft(), CLEAN, &cfg, Utc::now())
                .expect("submit");
        txn.commit();

        assert!(report.rewards.submission_rewarded);
        assert_eq!(report.status, ReportStatus::Pending);
        let read = db.read();
        assert_eq!(ledger::balance(&read, UserId::new(1)).expect("balance"), 5);
        assert_eq!(repo::load_report(&read, report.id).expect("load"), report);
    }

    #[test]
    fn test_gates_reject_submission() {
        let db = db_with_user(1);
        let cfg = RewardConfig::default();
        let mut txn = db.write().expect("write txn");

        let inauthentic = SubmissionGates { is_authentic: false, within_dedup_window: false };
        assert!(matches!(
            submit_report(&mut txn, UserId::new(1), draft(), inauthentic, &cfg, Utc::now())
                .unwrap_err(),
            CoreError::Validation { .. }
        ));

        let duplicate = SubmissionGates { is_authentic: true, within_dedup_window: true };
        assert!(matches!(
            submit_report(&mut txn, UserId::new(1), draft(), duplicate, &cfg, Utc::now())
                .unwrap_err(),
            CoreError::Validation { .. }
        ));
    }

    #[test]
    fn test_acceptance_credits_approval_reward_once() {
        let db = db_with_user(1);
        let cfg = RewardConfig::default();

        let mut txn = db.write().expect("write txn");
        let report =
            submit_report(&mut txn, UserId::new(1), draft(), CLEAN, &cfg, Utc::now())
                .expect("submit");
        txn.commit();

        let mut txn = db.write().expect("write txn");
        let reviewed =
            review_report(&mut txn, report.id, ReportStatus::Accepted, &cfg, Utc::now())
                .expect("accept");
        assert!(reviewed.rewards.approval_rewarded);
        txn.commit();
        // 5 for submission + 20 for approval.
        assert_eq!(ledger::balance(&db.read(), UserId::new(1)).expect("balance"), 25);

        // A second pass over Accepted (via Rejected and back) never re-credits.
        let mut txn = db.write().expect("write txn");
        review_report(&mut txn, report.id, ReportStatus::Rejected, &cfg, Utc::now())
            .expect("reject");
        review_report(&mut txn, report.id, ReportStatus::Accepted, &cfg, Utc::now())
            .expect("re-accept");
        txn.commit();
        assert_eq!(ledger::balance(&db.read(), UserId::new(1)).expect("balance"), 25);
    }

    #[test]
    fn test_review_cannot_return_to_pending() {
        let db = db_with_user(1);
        let cfg = RewardConfig::default();
        let mut txn = db.write().expect("write txn");
        let report =
            submit_report(&mut txn, UserId::new(1), draft(), CLEAN, &cfg, Utc::now())
                .expect("submit");
        let err = review_report(&mut txn, report.id, ReportStatus::Pending, &cfg, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn test_review_missing_report() {
        let db = db_with_user(1);
        let cfg = RewardConfig::default();
        let mut txn = db.write().expect("write txn");
        let err =
            review_report(&mut txn, ReportId::new(404), ReportStatus::InReview, &cfg, Utc::now())
                .unwrap_err();
        assert!(matches!(err, CoreError::ReportNotFound { .. }));
    }
}
