// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scrub scheduling loop

use crate::initiator::{ScheduleResult, ScrubInitiator};
use crate::scheduler::{Scheduler, TickKnobs};
use chrono::{DateTime, TimeDelta, Utc};
use pgscrub_core::{BudgetSnapshot, Clock, ResourceBudget, ScrubConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Shortest pause between ticks, used when no sleep is configured
pub const MIN_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the scheduler on a timer
pub struct ScrubService<C: Clock, I: ScrubInitiator> {
    scheduler: Scheduler<C, I>,
    budget: Arc<ResourceBudget>,
    /// When the load average was last folded in
    last_load_sample: Mutex<Option<DateTime<Utc>>>,
}

impl<C, I> ScrubService<C, I>
where
    C: Clock,
    I: ScrubInitiator,
{
    pub fn new(scheduler: Scheduler<C, I>, budget: Arc<ResourceBudget>) -> Self {
        Self {
            scheduler,
            budget,
            last_load_sample: Mutex::new(None),
        }
    }

    pub fn scheduler(&self) -> &Scheduler<C, I> {
        &self.scheduler
    }

    pub fn budget(&self) -> BudgetSnapshot {
        self.budget.snapshot()
    }

    /// Run a single tick with default knobs.
    pub async fn tick_once(&self) -> ScheduleResult {
        let config = self.scheduler.config();
        self.budget.set_max_scrubs(config.max_scrubs);

        self.sample_load(&config);

        let result = self
            .scheduler
            .select_pg_and_scrub(TickKnobs::default())
            .await;
        debug!(%result, budget = ?self.budget.snapshot(), "tick finished");
        result
    }

    /// Fold the current load into the daily average, at most once per
    /// heartbeat interval.
    fn sample_load(&self, config: &ScrubConfig) {
        let now = self.scheduler.clock().now();
        let heartbeat = TimeDelta::from_std(config.heartbeat_interval).unwrap_or(TimeDelta::MAX);

        let mut last = self
            .last_load_sample
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if last.is_some_and(|at| now.signed_duration_since(at) < heartbeat) {
            return;
        }
        *last = Some(now);

        if let Some(load_pct) = self
            .scheduler
            .policy()
            .load_gate()
            .update_load_average(config)
        {
            trace!(load_pct, "load sampled");
        }
    }

    /// Delay until the next tick
    pub fn next_sleep(&self) -> Duration {
        let config = self.scheduler.config();
        let now = self.scheduler.clock().now();
        self.scheduler
            .policy()
            .scrub_sleep_time(false, now, &config)
            .max(MIN_TICK_INTERVAL)
    }

    /// Tick until `shutdown` turns true or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("scrub service started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.tick_once().await;
            let delay = self.next_sleep();
            trace!(?delay, "sleeping");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown sender dropped");
                        break;
                    }
                }
            }
        }

        info!("scrub service stopped");
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
