// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System load gate
//!
//! Scrubs are opportunistic work: they only start when the machine has
//! headroom. The gate combines the instantaneous per-CPU load with a slowly
//! moving daily average.

use crate::config::ScrubConfig;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of the 1, 5 and 15 minute load averages
pub trait LoadSource: Send + Sync {
    /// `None` when the platform has no load-average facility
    fn load_averages(&self) -> Option<[f64; 3]>;
}

/// Reads `/proc/loadavg`
#[derive(Debug, Clone)]
pub struct ProcLoadAvg {
    path: PathBuf,
}

impl ProcLoadAvg {
    pub fn new() -> Self {
        Self::with_path("/proc/loadavg")
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcLoadAvg {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadSource for ProcLoadAvg {
    fn load_averages(&self) -> Option<[f64; 3]> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        parse_loadavg(&content)
    }
}

/// Parse the first three fields of a `/proc/loadavg` line
pub fn parse_loadavg(content: &str) -> Option<[f64; 3]> {
    let mut fields = content.split_whitespace().map(str::parse::<f64>);
    let one = fields.next()?.ok()?;
    let five = fields.next()?.ok()?;
    let fifteen = fields.next()?.ok()?;
    Some([one, five, fifteen])
}

/// For platforms without load averages
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoadFacility;

impl LoadSource for NoLoadFacility {
    fn load_averages(&self) -> Option<[f64; 3]> {
        None
    }
}

/// Fixed load averages, settable from tests
#[derive(Debug, Default)]
pub struct FixedLoad {
    averages: Mutex<Option<[f64; 3]>>,
}

impl FixedLoad {
    pub fn new(averages: [f64; 3]) -> Self {
        Self {
            averages: Mutex::new(Some(averages)),
        }
    }

    pub fn set(&self, averages: [f64; 3]) {
        *self.averages.lock().unwrap_or_else(|e| e.into_inner()) = Some(averages);
    }
}

impl LoadSource for FixedLoad {
    fn load_averages(&self) -> Option<[f64; 3]> {
        *self.averages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Decides whether system load permits starting a scrub
pub struct LoadGate {
    source: Box<dyn LoadSource>,
    cpus: usize,
    daily_loadavg: Mutex<f64>,
}

impl LoadGate {
    pub fn new(source: impl LoadSource + 'static) -> Self {
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self::with_cpus(source, cpus)
    }

    pub fn with_cpus(source: impl LoadSource + 'static, cpus: usize) -> Self {
        Self {
            source: Box::new(source),
            cpus: cpus.max(1),
            daily_loadavg: Mutex::new(1.0),
        }
    }

    pub fn daily_loadavg(&self) -> f64 {
        *self.daily_loadavg.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fold the current 1-minute load into the daily average.
    ///
    /// Expected to be called once per heartbeat. Returns the current load as
    /// a percentage, or `None` without a load facility.
    pub fn update_load_average(&self, config: &ScrubConfig) -> Option<f64> {
        let [one, _, _] = self.source.load_averages()?;

        let heartbeat = config.heartbeat_interval.as_secs().max(1);
        let n_samples = (DAY.as_secs() / heartbeat).max(1) as f64;

        let mut daily = self.daily_loadavg.lock().unwrap_or_else(|e| e.into_inner());
        *daily = (*daily * (n_samples - 1.0) + one) / n_samples;
        debug!(daily_loadavg = *daily, "load average updated");

        Some(100.0 * one)
    }

    /// True when there is headroom for a scrub.
    pub fn load_is_low(&self, config: &ScrubConfig) -> bool {
        let Some([one, _, fifteen]) = self.source.load_averages() else {
            debug!("no load average facility, not gating on load");
            return true;
        };

        let per_cpu = one / self.cpus as f64;
        if per_cpu < config.load_threshold {
            debug!(per_cpu, max = config.load_threshold, "load below threshold");
            return true;
        }

        // still allowed when load is below the daily norm and decreasing
        let daily = self.daily_loadavg();
        if one < daily && one < fifteen {
            debug!(one, daily, fifteen, "load below daily average and falling");
            return true;
        }

        debug!(
            one,
            max = config.load_threshold,
            daily,
            fifteen,
            "load too high for scrubbing"
        );
        false
    }
}

#[cfg(test)]
#[path = "load_tests.rs"]
mod tests;
