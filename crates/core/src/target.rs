// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scrub target time computation

use crate::clock::add_duration;
use crate::config::ScrubConfig;
use crate::job::{MustScrub, SchedParams, Schedule};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::trace;

/// Turns a PG's suggested scrub time into a concrete schedule.
///
/// Non-mandatory scrubs are pushed out by the minimum interval plus a random
/// spread, so that PGs created together do not all come due at once.
pub struct TargetTimeCalculator {
    rng: Mutex<StdRng>,
}

impl TargetTimeCalculator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic spread for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn next_unit(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .random::<f64>()
    }

    pub fn adjust_target_time(&self, params: &SchedParams, config: &ScrubConfig) -> Schedule {
        if params.is_must == MustScrub::Mandatory {
            return Schedule::new(params.proposed_time, None);
        }

        let min_interval = effective(params.min_interval, config.min_interval);
        let max_interval = effective(params.max_interval, config.max_interval);
        trace!(
            ?min_interval,
            ?max_interval,
            ratio = config.interval_randomize_ratio,
            proposed = %params.proposed_time,
            "adjusting target time"
        );

        let factor = config.interval_randomize_ratio * self.next_unit();
        let spread = Duration::try_from_secs_f64(min_interval.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX);
        let scheduled_at = add_duration(
            add_duration(params.proposed_time, min_interval),
            spread,
        );

        let deadline = if max_interval.is_zero() {
            None
        } else {
            Some(add_duration(params.proposed_time, max_interval))
        };

        trace!(%scheduled_at, ?deadline, "target time adjusted");
        Schedule::new(scheduled_at, deadline)
    }
}

impl Default for TargetTimeCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// A per-PG override applies only when set to a non-zero value
fn effective(overridden: Option<Duration>, configured: Duration) -> Duration {
    overridden
        .filter(|interval| !interval.is_zero())
        .unwrap_or(configured)
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
