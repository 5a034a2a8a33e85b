//! Security configuration.
//!
//! Configuration is loaded from environment variables with sensible defaults.
//! The defaults match the usual SAML deployment values: three minutes of
//! clock skew and message lifetime, one minute for artifacts.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings for policy rules, the artifact map and storage reaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Tolerated clock difference between peers, in seconds.
    pub clock_skew_secs: i64,

    /// How long an issued message stays acceptable, in seconds.
    pub message_lifetime_secs: i64,

    /// Whether a message without an issue instant is rejected.
    pub require_issue_instant: bool,

    /// Whether a message without an ID is rejected by the replay rule.
    pub require_message_id: bool,

    /// Lifetime of artifact map entries, in seconds.
    pub artifact_lifetime_secs: i64,

    /// How long message IDs are remembered by the replay cache, in seconds.
    pub replay_cache_expiration_secs: i64,

    /// Interval between background storage reaps, in seconds.
    pub storage_reaper_interval_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            clock_skew_secs: 180,
            message_lifetime_secs: 180,
            require_issue_instant: true,
            require_message_id: true,
            artifact_lifetime_secs: 60,
            replay_cache_expiration_secs: 28_800,
            storage_reaper_interval_secs: 600,
        }
    }
}

impl SecurityConfig {
    /// Loads configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their default value.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let config = Self {
            clock_skew_secs: env_or("KC_SAML_CLOCK_SKEW", defaults.clock_skew_secs),
            message_lifetime_secs: env_or(
                "KC_SAML_MESSAGE_LIFETIME",
                defaults.message_lifetime_secs,
            ),
            require_issue_instant: env_flag(
                "KC_SAML_REQUIRE_ISSUE_INSTANT",
                defaults.require_issue_instant,
            ),
            require_message_id: env_flag(
                "KC_SAML_REQUIRE_MESSAGE_ID",
                defaults.require_message_id,
            ),
            artifact_lifetime_secs: env_or(
                "KC_SAML_ARTIFACT_LIFETIME",
                defaults.artifact_lifetime_secs,
            ),
            replay_cache_expiration_secs: env_or(
                "KC_SAML_REPLAY_EXPIRATION",
                defaults.replay_cache_expiration_secs,
            ),
            storage_reaper_interval_secs: env_or(
                "KC_STORAGE_REAPER_INTERVAL",
                defaults.storage_reaper_interval_secs,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that all durations are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.clock_skew_secs < 0 {
            return Err(Error::config("clock skew must not be negative"));
        }
        if self.message_lifetime_secs < 0 {
            return Err(Error::config("message lifetime must not be negative"));
        }
        if self.artifact_lifetime_secs <= 0 {
            return Err(Error::config("artifact lifetime must be positive"));
        }
        if self.replay_cache_expiration_secs <= 0 {
            return Err(Error::config("replay cache expiration must be positive"));
        }
        if self.storage_reaper_interval_secs == 0 {
            return Err(Error::config("storage reaper interval must be positive"));
        }

        for (name, secs) in [
            ("clock skew", self.clock_skew_secs),
            ("message lifetime", self.message_lifetime_secs),
            ("artifact lifetime", self.artifact_lifetime_secs),
            ("replay cache expiration", self.replay_cache_expiration_secs),
        ] {
            if Duration::try_seconds(secs).is_none() {
                return Err(Error::config(format!("{name} of {secs} seconds is out of range")));
            }
        }
        Ok(())
    }

    /// Returns the clock skew.
    #[must_use]
    pub fn clock_skew(&self) -> Duration {
        seconds(self.clock_skew_secs)
    }

    /// Returns the message lifetime.
    #[must_use]
    pub fn message_lifetime(&self) -> Duration {
        seconds(self.message_lifetime_secs)
    }

    /// Returns the artifact lifetime.
    #[must_use]
    pub fn artifact_lifetime(&self) -> Duration {
        seconds(self.artifact_lifetime_secs)
    }

    /// Returns the replay cache expiration.
    #[must_use]
    pub fn replay_cache_expiration(&self) -> Duration {
        seconds(self.replay_cache_expiration_secs)
    }

    /// Returns the storage reaper interval.
    #[must_use]
    pub const fn storage_reaper_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.storage_reaper_interval_secs)
    }
}

/// Out of range values saturate; [`SecurityConfig::validate`] rejects them.
fn seconds(secs: i64) -> Duration {
    Duration::try_seconds(secs).unwrap_or(if secs < 0 { Duration::MIN } else { Duration::MAX })
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v.to_lowercase() != "false" && v != "0")
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_three_minute_windows() {
        let config = SecurityConfig::default();
        assert_eq!(config.clock_skew(), Duration::minutes(3));
        assert_eq!(config.message_lifetime(), Duration::minutes(3));
        assert_eq!(config.artifact_lifetime(), Duration::minutes(1));
        assert!(config.require_issue_instant);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_skew_is_rejected() {
        let config = SecurityConfig {
            clock_skew_secs: -1,
            ..SecurityConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_artifact_lifetime_is_rejected() {
        let config = SecurityConfig {
            artifact_lifetime_secs: 0,
            ..SecurityConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn overflowing_durations_are_rejected() {
        let config = SecurityConfig {
            artifact_lifetime_secs: i64::MAX,
            ..SecurityConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("artifact lifetime"));

        let config = SecurityConfig {
            clock_skew_secs: i64::MAX / 1000 + 1,
            ..SecurityConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn accessors_saturate_instead_of_panicking() {
        let config = SecurityConfig {
            artifact_lifetime_secs: i64::MAX,
            ..SecurityConfig::default()
        };
        assert_eq!(config.artifact_lifetime(), Duration::MAX);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SecurityConfig =
            serde_json::from_str(r#"{"clock_skew_secs": 60}"#).unwrap();
        assert_eq!(config.clock_skew_secs, 60);
        assert_eq!(config.message_lifetime_secs, 180);
    }
}
