//! Manager configuration.
//!
//! A [`ManagerConfig`] carries the per-phase catch policy and the scheduling
//! parameters the host scheduler reads when it wires up the open / update /
//! close jobs. Every field has a default, so an empty TOML document is valid:
//!
//! ```toml
//! [schedule]
//! period_secs = 0.05
//! phase = 60000
//! job_class = "input_processing"
//!
//! [policy]
//! catch_open_failures = true
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Scheduling parameters for the host's periodic `update_all` job.
///
/// The manager never reads these itself; it stores them for the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSchedule {
    /// Seconds between `update_all` calls.
    pub period_secs: f64,
    /// Ordering key among jobs that run in the same cycle.
    pub phase: u16,
    /// Host-defined job class name.
    pub job_class: String,
}

impl Default for JobSchedule {
    fn default() -> Self {
        Self {
            period_secs: 0.1,
            phase: 60000,
            job_class: "scheduled".to_string(),
        }
    }
}

impl JobSchedule {
    /// Period as a [`Duration`].
    ///
    /// Fails for zero, negative, non-finite, or out-of-range `period_secs`.
    pub fn period(&self) -> Result<Duration, ConfigError> {
        let secs = self.period_secs;
        match Duration::try_from_secs_f64(secs) {
            Ok(period) if !period.is_zero() => Ok(period),
            _ => Err(ConfigError::Invalid(format!(
                "schedule.period_secs must be a positive number of seconds, got {secs}"
            ))),
        }
    }
}

/// Whether failures in each phase are logged and skipped (`true`) or returned
/// to the caller (`false`).
///
/// Rumble shares `catch_update_failures`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    pub catch_open_failures: bool,
    pub catch_update_failures: bool,
    pub catch_close_failures: bool,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            catch_open_failures: false,
            catch_update_failures: true,
            catch_close_failures: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub schedule: JobSchedule,
    pub policy: FailurePolicy,
}

impl ManagerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ManagerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schedule.period()?;
        if self.schedule.job_class.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "schedule.job_class must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_phase_policy() {
        let policy = FailurePolicy::default();
        assert!(!policy.catch_open_failures);
        assert!(policy.catch_update_failures);
        assert!(policy.catch_close_failures);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(ManagerConfig::default().validate().is_ok());
        assert_eq!(
            JobSchedule::default().period().ok(),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn period_rejects_values_duration_cannot_hold() {
        for secs in [0.0, -0.5, 1e20, f64::INFINITY, f64::NAN, 1e-12] {
            let schedule = JobSchedule {
                period_secs: secs,
                ..JobSchedule::default()
            };
            assert!(schedule.period().is_err(), "period_secs = {secs}");
        }
    }
}
