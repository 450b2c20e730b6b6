//! Account creation.
//!
//! A new account and its signup bonus are one transactional unit, so a user
//! with a nonzero balance always has the matching ledger entry.

use chrono::{DateTime, Utc};
use clearstream_store::WriteTransaction;
use clearstream_types::{
    config::RewardConfig, error::ValidationSnafu, PointSource, Result, User, UserId,
};

use crate::{ledger, repo};

/// Creates a user with the signup bonus credited through the ledger.
///
/// Email uniqueness is enforced at the API layer; this module only validates
/// shape.
///
/// # Errors
///
/// `Validation` for an empty name or a malformed email.
pub fn create_user(
    txn: &mut WriteTransaction<'_>,
    name: &str,
    email: &str,
    cfg: &RewardConfig,
    now: DateTime<Utc>,
) -> Result<User> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
        return ValidationSnafu { message: "name must not be empty" }.fail();
    }
    if email.is_empty() || !email.contains('@') {
        return ValidationSnafu { message: format!("invalid email address: {email:?}") }.fail();
    }

    let user = User {
        id: UserId::new(repo::new_id()?),
        name: name.to_string(),
        email: email.to_string(),
        points: 0,
        points_history: Vec::new(),
        participated_campaigns: Vec::new(),
        created_at: now,
    };
    repo::store_user(txn, &user)?;
    if cfg.signup_bonus > 0 {
        ledger::credit(
            txn,
            user.id,
            cfg.signup_bonus,
            "Welcome signup bonus",
            PointSource::Signup,
            None,
            now,
        )?;
    }
    tracing::info!(user = %user.id, signup_bonus = cfg.signup_bonus, "user created");
    repo::load_user(txn, user.id)
}
