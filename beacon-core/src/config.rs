//! Run configuration for the probing engine.
//!
//! A [`CheckConfig`] is built once per run and threaded into the probe, the
//! trial aggregator and the batch runner. Nothing in the engine reads
//! process-wide settings on its own; [`CheckConfig::from_env`] is the only
//! place the environment is consulted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BeaconError, Result};

pub const DEFAULT_TRIAL_COUNT: usize = 5;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TRIAL_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_WARNING_DAYS: i64 = 30;
pub const DEFAULT_CRITICAL_DAYS: i64 = 7;

/// Environment variable overriding the number of trials per domain.
pub const TRIAL_COUNT_ENV: &str = "TEST_COUNT";
/// Environment variable overriding how many domains are checked at once.
pub const CONCURRENCY_ENV: &str = "BEACON_CONCURRENCY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Probe executions per domain.
    pub trial_count: usize,
    /// Budget for each HTTP request and each TLS connect/handshake.
    pub request_timeout: Duration,
    /// Pause between consecutive trials of the same domain.
    pub trial_delay: Duration,
    /// Certificates expiring within this many days are flagged.
    pub warning_days: i64,
    /// Flagged certificates within this many days are critical.
    pub critical_days: i64,
    /// Domains checked in parallel. 1 keeps the run strictly sequential.
    pub concurrency: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            trial_count: DEFAULT_TRIAL_COUNT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            trial_delay: DEFAULT_TRIAL_DELAY,
            warning_days: DEFAULT_WARNING_DAYS,
            critical_days: DEFAULT_CRITICAL_DAYS,
            concurrency: 1,
        }
    }
}

impl CheckConfig {
    /// Same as [`CheckConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of trials run per domain.
    pub fn with_trial_count(mut self, trial_count: usize) -> Self {
        self.trial_count = trial_count;
        self
    }

    /// Set the timeout applied to each request and TLS handshake.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the pause between consecutive trials of one domain.
    pub fn with_trial_delay(mut self, delay: Duration) -> Self {
        self.trial_delay = delay;
        self
    }

    /// Certificates expiring within this many days are reported.
    pub fn with_warning_days(mut self, days: i64) -> Self {
        self.warning_days = days;
        self
    }

    /// Certificates expiring within this many days are reported as critical.
    pub fn with_critical_days(mut self, days: i64) -> Self {
        self.critical_days = days;
        self
    }

    /// Set how many domains are checked at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Defaults overlaid with `TEST_COUNT` and `BEACON_CONCURRENCY` when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(TRIAL_COUNT_ENV) {
            config.trial_count = parse_positive(TRIAL_COUNT_ENV, &raw)?;
        }
        if let Some(raw) = lookup(CONCURRENCY_ENV) {
            config.concurrency = parse_positive(CONCURRENCY_ENV, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject zero trial counts or concurrency, and a critical threshold above
    /// the warning threshold.
    pub fn validate(&self) -> Result<()> {
        if self.trial_count == 0 {
            return Err(BeaconError::InvalidConfig(
                "trial count must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(BeaconError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.critical_days > self.warning_days {
            return Err(BeaconError::InvalidConfig(format!(
                "critical threshold ({} days) exceeds warning threshold ({} days)",
                self.critical_days, self.warning_days
            )));
        }
        Ok(())
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(BeaconError::InvalidConfig(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckConfig::default();
        assert_eq!(config.trial_count, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.trial_delay, Duration::from_secs(1));
        assert_eq!(config.warning_days, 30);
        assert_eq!(config.critical_days, 7);
        assert_eq!(config.concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = CheckConfig::new()
            .with_trial_count(3)
            .with_request_timeout(Duration::from_secs(2))
            .with_trial_delay(Duration::ZERO)
            .with_concurrency(4);

        assert_eq!(config.trial_count, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.trial_delay, Duration::ZERO);
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_validate_rejects_zero_trials() {
        let config = CheckConfig::new().with_trial_count(0);
        assert!(matches!(
            config.validate(),
            Err(BeaconError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let config = CheckConfig::new()
            .with_warning_days(5)
            .with_critical_days(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = CheckConfig::from_lookup(|key| match key {
            TRIAL_COUNT_ENV => Some(" 3 ".to_string()),
            CONCURRENCY_ENV => Some("8".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.trial_count, 3);
        assert_eq!(config.concurrency, 8);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = CheckConfig::from_lookup(|key| {
            (key == TRIAL_COUNT_ENV).then(|| "five".to_string())
        });
        assert!(result.is_err());

        let result = CheckConfig::from_lookup(|key| {
            (key == TRIAL_COUNT_ENV).then(|| "0".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_from_lookup_without_env_is_default() {
        let config = CheckConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CheckConfig::default());
    }
}
