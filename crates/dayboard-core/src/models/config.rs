//! Application configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    pub log_level: String,
    /// Minutes between cadence reset passes while the daemon stays up.
    pub reset_check_minutes: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerConfig {
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.daemon.validate()?;
        self.timer.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            daemon: DaemonConfig::default(),
            timer: TimerConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.reset_check_minutes == 0 {
            return Err(Error::Validation(
                "Reset check interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            reset_check_minutes: 60,
        }
    }
}

impl TimerConfig {
    pub const MAX_MINUTES: u32 = 120;

    pub fn validate(&self) -> Result<()> {
        Self::validate_minutes("Work", self.work_minutes)?;
        Self::validate_minutes("Break", self.break_minutes)?;
        Ok(())
    }

    fn validate_minutes(label: &str, minutes: u32) -> Result<()> {
        if minutes == 0 {
            return Err(Error::Validation(format!(
                "{} duration must be greater than 0",
                label
            )));
        }

        if minutes > Self::MAX_MINUTES {
            return Err(Error::Validation(format!(
                "{} duration too long (max {} minutes)",
                label,
                Self::MAX_MINUTES
            )));
        }

        Ok(())
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
        }
    }
}
