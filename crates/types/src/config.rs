//! Configuration types for the campaign platform.
//!
//! Configuration is loaded from TOML files and environment variables by the
//! embedding service. All config structs validate their values at
//! construction time via fallible builders; post-deserialization validation
//! is available via the `validate()` method on each struct.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Configuration validation error.
///
/// Returned when a configuration value is outside its valid range or
/// violates a cross-field constraint.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// A configuration value is invalid.
    #[snafu(display("invalid config: {message}"))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },
}

/// Duration serialization using humantime format.
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }

    /// `Option<Duration>` variant; absent or `null` maps to `None`.
    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(
            duration: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => {
                    serializer.serialize_some(&humantime::format_duration(*d).to_string())
                },
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s: Option<String> = Option::deserialize(deserializer)?;
            s.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

// =============================================================================
// Reward Configuration
// =============================================================================

/// Default one-time signup bonus.
fn default_signup_bonus() -> i64 {
    50
}

/// Default one-time report submission reward.
fn default_report_submission_reward() -> i64 {
    5
}

/// Default one-time report approval reward.
fn default_report_approval_reward() -> i64 {
    20
}

/// Default fixed reward per eligible participant at campaign completion.
fn default_participant_reward() -> i64 {
    10
}

/// Default creator reward rate per eligible participant.
fn default_per_participant_creator_rate() -> i64 {
    2
}

/// Default cap on the creator's completion reward.
fn default_creator_cap() -> i64 {
    200
}

/// Point amounts credited by the reward workflows.
///
/// The campaign-completion formula is
/// `creator_reward = min(creator_cap, eligible_count * per_participant_creator_rate)`,
/// plus a fixed `participant_reward` for every eligible participant.
///
/// # Example
///
/// ```no_run
/// # use clearstream_types::config::RewardConfig;
/// let config = RewardConfig::builder()
///     .participant_reward(25)
///     .creator_cap(500)
///     .build()
///     .expect("valid reward config");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RewardConfig {
    /// One-time bonus credited on account creation.
    ///
    /// Must be >= 0.
    #[serde(default = "default_signup_bonus")]
    pub signup_bonus: i64,
    /// One-time reward for submitting a pollution report.
    ///
    /// Must be >= 0.
    #[serde(default = "default_report_submission_reward")]
    pub report_submission_reward: i64,
    /// One-time reward when a report is accepted in review.
    ///
    /// Must be >= 0.
    #[serde(default = "default_report_approval_reward")]
    pub report_approval_reward: i64,
    /// Fixed reward per eligible participant at campaign completion.
    ///
    /// Must be >= 0.
    #[serde(default = "default_participant_reward")]
    pub participant_reward: i64,
    /// Creator reward per eligible participant.
    ///
    /// Must be >= 0.
    #[serde(default = "default_per_participant_creator_rate")]
    pub per_participant_creator_rate: i64,
    /// Upper bound on the creator's completion reward.
    ///
    /// Must be >= 0.
    #[serde(default = "default_creator_cap")]
    pub creator_cap: i64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            signup_bonus: default_signup_bonus(),
            report_submission_reward: default_report_submission_reward(),
            report_approval_reward: default_report_approval_reward(),
            participant_reward: default_participant_reward(),
            per_participant_creator_rate: default_per_participant_creator_rate(),
            creator_cap: default_creator_cap(),
        }
    }
}

#[bon::bon]
impl RewardConfig {
    /// Creates a new reward configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any amount is negative.
    #[builder]
    pub fn new(
        #[builder(default = default_signup_bonus())] signup_bonus: i64,
        #[builder(default = default_report_submission_reward())] report_submission_reward: i64,
        #[builder(default = default_report_approval_reward())] report_approval_reward: i64,
        #[builder(default = default_participant_reward())] participant_reward: i64,
        #[builder(default = default_per_participant_creator_rate())]
        per_participant_creator_rate: i64,
        #[builder(default = default_creator_cap())] creator_cap: i64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            signup_bonus,
            report_submission_reward,
            report_approval_reward,
            participant_reward,
            per_participant_creator_rate,
            creator_cap,
        };
        config.validate()?;
        Ok(config)
    }
}

impl RewardConfig {
    /// Validates the configuration values.
    ///
    /// Call after deserialization to ensure values are within valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any amount is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let amounts = [
            ("signup_bonus", self.signup_bonus),
            ("report_submission_reward", self.report_submission_reward),
            ("report_approval_reward", self.report_approval_reward),
            ("participant_reward", self.participant_reward),
            ("per_participant_creator_rate", self.per_participant_creator_rate),
            ("creator_cap", self.creator_cap),
        ];
        for (name, value) in amounts {
            if value < 0 {
                return Err(ConfigError::Validation {
                    message: format!("{name} must be >= 0, got {value}"),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Participation Configuration
// =============================================================================

/// Default for allowing joins while a campaign is still Upcoming.
fn default_allow_upcoming_join() -> bool {
    true
}

/// Default limit on a creator's concurrent non-finished campaigns.
fn default_max_active_campaigns_per_creator() -> u32 {
    3
}

/// Policy knobs for campaign participation.
///
/// Both knobs resolve behaviors the product left open:
///
/// - `allow_upcoming_join` — whether users may pre-register for a campaign
///   that has not started yet. A Finished campaign can never be joined.
/// - `ineligible_leave_window` — anti-farming rule: when set, a participant
///   who leaves within this window of joining is kept in the participant set
///   with `eligible = false` (fixed at leave time), so they count against
///   nothing but earn nothing. When unset, leaving removes the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParticipationConfig {
    /// Whether joins are permitted while the campaign is Upcoming.
    #[serde(default = "default_allow_upcoming_join")]
    pub allow_upcoming_join: bool,
    /// Leaving within this window of joining marks the membership ineligible
    /// for rewards instead of removing it.
    #[serde(default, with = "humantime_serde::option")]
    #[schemars(with = "Option<String>")]
    pub ineligible_leave_window: Option<Duration>,
    /// Maximum concurrent non-finished campaigns per creator.
    ///
    /// Must be > 0.
    #[serde(default = "default_max_active_campaigns_per_creator")]
    pub max_active_campaigns_per_creator: u32,
}

impl Default for ParticipationConfig {
    fn default() -> Self {
        Self {
            allow_upcoming_join: default_allow_upcoming_join(),
            ineligible_leave_window: None,
            max_active_campaigns_per_creator: default_max_active_campaigns_per_creator(),
        }
    }
}

#[bon::bon]
impl ParticipationConfig {
    /// Creates a new participation configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a value is out of range.
    #[builder]
    pub fn new(
        #[builder(default = default_allow_upcoming_join())] allow_upcoming_join: bool,
        ineligible_leave_window: Option<Duration>,
        #[builder(default = default_max_active_campaigns_per_creator())]
        max_active_campaigns_per_creator: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            allow_upcoming_join,
            ineligible_leave_window,
            max_active_campaigns_per_creator,
        };
        config.validate()?;
        Ok(config)
    }
}

impl ParticipationConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_active_campaigns_per_creator == 0 {
            return Err(ConfigError::Validation {
                message: "max_active_campaigns_per_creator must be > 0".to_string(),
            });
        }
        if let Some(window) = self.ineligible_leave_window {
            if window.is_zero() {
                return Err(ConfigError::Validation {
                    message: "ineligible_leave_window must be > 0 when set".to_string(),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Sweep Configuration
// =============================================================================

/// Default interval between sweep cycles.
fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

/// Configuration for the periodic campaign sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SweepConfig {
    /// Interval between sweep cycles.
    ///
    /// Must be > 0.
    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { interval: default_sweep_interval() }
    }
}

#[bon::bon]
impl SweepConfig {
    /// Creates a new sweep configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the interval is zero.
    #[builder]
    pub fn new(
        #[builder(default = default_sweep_interval())] interval: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self { interval };
        config.validate()?;
        Ok(config)
    }
}

impl SweepConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::Validation {
                message: "sweep interval must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

/// Default number of write-transaction attempts before surfacing Contention.
fn default_max_attempts() -> u32 {
    3
}

/// Default backoff between write-transaction attempts.
fn default_retry_backoff() -> Duration {
    Duration::from_millis(10)
}

/// Bounded retry policy for write transactions.
///
/// A write transaction that cannot acquire the store's writer slot is
/// retried up to `max_attempts` times with `backoff` between attempts;
/// exhaustion surfaces `Contention` to the caller, which is safe to retry
/// from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RetryConfig {
    /// Maximum attempts per operation.
    ///
    /// Must be > 0.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between attempts.
    #[serde(default = "default_retry_backoff", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: default_max_attempts(), backoff: default_retry_backoff() }
    }
}

#[bon::bon]
impl RetryConfig {
    /// Creates a new retry configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `max_attempts` is zero.
    #[builder]
    pub fn new(
        #[builder(default = default_max_attempts())] max_attempts: u32,
        #[builder(default = default_retry_backoff())] backoff: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self { max_attempts, backoff };
        config.validate()?;
        Ok(config)
    }
}

impl RetryConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `max_attempts` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Validation {
                message: "max_attempts must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
