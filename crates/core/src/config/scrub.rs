// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scrub scheduling configuration
//!
//! Loaded from TOML. Durations use humantime syntax (`"1day"`, `"300s"`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors loading or validating a [`ScrubConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading file
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value outside its permitted range
    #[error("Invalid value {value} for {field}: expected {expected}")]
    Invalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Node-wide scrub scheduling knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrubConfig {
    /// Maximum concurrently active scrubs, local and remote combined
    pub max_scrubs: u32,
    /// Lower bound between scrubs of the same PG
    #[serde(with = "humantime_serde")]
    pub min_interval: Duration,
    /// Deadline after which a scrub runs regardless of load and time window.
    /// Zero disables deadlines.
    #[serde(with = "humantime_serde")]
    pub max_interval: Duration,
    /// Fraction of `min_interval` used as random spread
    pub interval_randomize_ratio: f64,
    /// Delay between scheduling ticks
    #[serde(with = "humantime_serde")]
    pub sleep: Duration,
    /// Delay between ticks while outside the admission window
    #[serde(with = "humantime_serde")]
    pub extended_sleep: Duration,
    /// Fixed grace added to the penalty of a job that failed remote reservation
    #[serde(with = "humantime_serde")]
    pub penalty_grace: Duration,
    /// First day (0 = Sunday) of the admission window
    pub begin_week_day: u32,
    /// Day (exclusive) ending the admission window
    pub end_week_day: u32,
    /// First hour of the admission window
    pub begin_hour: u32,
    /// Hour (exclusive) ending the admission window
    pub end_hour: u32,
    /// Per-CPU load average below which scrubbing is allowed
    pub load_threshold: f64,
    /// Period at which the load average is sampled
    #[serde(with = "humantime_serde")]
    pub heartbeat_interval: Duration,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            max_scrubs: 1,
            min_interval: DAY,
            max_interval: 7 * DAY,
            interval_randomize_ratio: 0.5,
            sleep: Duration::ZERO,
            extended_sleep: Duration::ZERO,
            penalty_grace: Duration::from_secs(300),
            begin_week_day: 0,
            end_week_day: 0,
            begin_hour: 0,
            end_hour: 0,
            load_threshold: 0.5,
            heartbeat_interval: Duration::from_secs(6),
        }
    }
}

impl ScrubConfig {
    /// Parse and validate configuration from TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScrubConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check every field against its permitted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_scrubs == 0 {
            return Err(invalid("max_scrubs", self.max_scrubs, ">= 1"));
        }
        for (field, day) in [
            ("begin_week_day", self.begin_week_day),
            ("end_week_day", self.end_week_day),
        ] {
            if day > 6 {
                return Err(invalid(field, day, "0..=6"));
            }
        }
        for (field, hour) in [("begin_hour", self.begin_hour), ("end_hour", self.end_hour)] {
            if hour > 23 {
                return Err(invalid(field, hour, "0..=23"));
            }
        }
        if self.interval_randomize_ratio.is_nan() || self.interval_randomize_ratio < 0.0 {
            return Err(invalid(
                "interval_randomize_ratio",
                self.interval_randomize_ratio,
                ">= 0",
            ));
        }
        if self.load_threshold.is_nan() || self.load_threshold < 0.0 {
            return Err(invalid("load_threshold", self.load_threshold, ">= 0"));
        }
        Ok(())
    }

    pub fn with_max_scrubs(mut self, max_scrubs: u32) -> Self {
        self.max_scrubs = max_scrubs;
        self
    }

    pub fn with_intervals(mut self, min: Duration, max: Duration) -> Self {
        self.min_interval = min;
        self.max_interval = max;
        self
    }

    pub fn with_randomize_ratio(mut self, ratio: f64) -> Self {
        self.interval_randomize_ratio = ratio;
        self
    }

    pub fn with_sleep(mut self, sleep: Duration, extended: Duration) -> Self {
        self.sleep = sleep;
        self.extended_sleep = extended;
        self
    }

    pub fn with_week_days(mut self, begin: u32, end: u32) -> Self {
        self.begin_week_day = begin;
        self.end_week_day = end;
        self
    }

    pub fn with_hours(mut self, begin: u32, end: u32) -> Self {
        self.begin_hour = begin;
        self.end_hour = end;
        self
    }

    pub fn with_load_threshold(mut self, threshold: f64) -> Self {
        self.load_threshold = threshold;
        self
    }
}

fn invalid(field: &'static str, value: impl ToString, expected: &'static str) -> ConfigError {
    ConfigError::Invalid {
        field,
        value: value.to_string(),
        expected,
    }
}

#[cfg(test)]
#[path = "scrub_tests.rs"]
mod tests;
