// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-tick scrub candidate selection

use crate::initiator::{InitiateResult, ScheduleResult, ScrubInitiator};
use chrono::{DateTime, Utc};
use pgscrub_core::clock::add_duration;
use pgscrub_core::{
    AdmissionPolicy, Clock, ConfigSource, JobRegistry, ScrubConfig, ScrubJob, TickPrep,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Node-level conditions evaluated once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrubPreconds {
    pub time_permit: bool,
    pub load_is_low: bool,
    /// Only jobs past their deadline may start
    pub only_deadlined: bool,
}

impl ScrubPreconds {
    pub fn new(time_permit: bool, load_is_low: bool) -> Self {
        Self {
            time_permit,
            load_is_low,
            only_deadlined: !(time_permit && load_is_low),
        }
    }
}

/// Per-tick options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickKnobs {
    /// Return every penalized job to the active queue first
    pub restore_penalized: bool,
    /// Forwarded to the initiator
    pub allow_requested_repair_only: bool,
}

/// Scheduler dependencies
pub struct SchedulerDeps<C, I> {
    pub registry: Arc<JobRegistry>,
    pub policy: AdmissionPolicy,
    pub config: Arc<dyn ConfigSource>,
    pub clock: C,
    pub initiator: I,
}

/// Picks the next PG to scrub and hands it to the initiator
pub struct Scheduler<C: Clock, I: ScrubInitiator> {
    registry: Arc<JobRegistry>,
    policy: AdmissionPolicy,
    config: Arc<dyn ConfigSource>,
    clock: C,
    initiator: I,
    /// Set when the previous tick fell back to the penalized jobs
    restore_penalized: AtomicBool,
}

impl<C, I> Scheduler<C, I>
where
    C: Clock,
    I: ScrubInitiator,
{
    pub fn new(deps: SchedulerDeps<C, I>) -> Self {
        Self {
            registry: deps.registry,
            policy: deps.policy,
            config: deps.config,
            clock: deps.clock,
            initiator: deps.initiator,
            restore_penalized: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn initiator(&self) -> &I {
        &self.initiator
    }

    pub fn config(&self) -> ScrubConfig {
        self.config.current()
    }

    /// Whether the next tick will forgive every penalized job
    pub fn restore_pending(&self) -> bool {
        self.restore_penalized.load(Ordering::SeqCst)
    }

    pub fn preconditions(&self, now: DateTime<Utc>, config: &ScrubConfig) -> ScrubPreconds {
        ScrubPreconds::new(
            self.policy.time_permit(now, config),
            self.policy.load_is_low(config),
        )
    }

    /// Run one scheduling tick.
    ///
    /// At most one scrub is initiated. The queue lock is only held while the
    /// ripe candidates are copied out.
    pub async fn select_pg_and_scrub(&self, knobs: TickKnobs) -> ScheduleResult {
        let config = self.config.current();
        let now = self.clock.now();
        let preconds = self.preconditions(now, &config);
        debug!(
            time_permit = preconds.time_permit,
            load_is_low = preconds.load_is_low,
            only_deadlined = preconds.only_deadlined,
            "scrub tick"
        );

        // swap unconditionally: a pending restore is consumed by this tick
        let pending = self.restore_penalized.swap(false, Ordering::SeqCst);
        let ripe = self.registry.prepare_tick(TickPrep {
            now,
            forgive_all: knobs.restore_penalized || pending,
            penalty_timeout: add_duration(now, penalty_delay(&config)),
        });
        debug!(
            active = ripe.active.len(),
            penalized = ripe.penalized.len(),
            "ripe scrub candidates"
        );

        let result = self
            .select_from_group(&ripe.active, preconds, now, knobs.allow_requested_repair_only)
            .await;
        if result != ScheduleResult::NoneReady || ripe.penalized.is_empty() {
            info!(%result, "scrub tick done");
            return result;
        }

        debug!("no active candidate, trying penalized jobs");
        let result = self
            .select_from_group(
                &ripe.penalized,
                preconds,
                now,
                knobs.allow_requested_repair_only,
            )
            .await;
        self.restore_penalized.store(true, Ordering::SeqCst);
        info!(%result, "scrub tick done (penalized)");
        result
    }

    /// Walk `group` in order, asking the initiator to start each candidate.
    pub async fn select_from_group(
        &self,
        group: &[Arc<ScrubJob>],
        preconds: ScrubPreconds,
        now: DateTime<Utc>,
        allow_requested_repair_only: bool,
    ) -> ScheduleResult {
        if group.is_empty() {
            return ScheduleResult::NoneReady;
        }

        for job in group {
            let pgid = job.pgid();
            if preconds.only_deadlined && !job.schedule().is_overdue(now) {
                trace!(%pgid, "skipped, not past deadline");
                continue;
            }

            match self
                .initiator
                .initiate_scrub(&pgid, allow_requested_repair_only)
                .await
            {
                InitiateResult::ScrubInitiated => {
                    debug!(%pgid, "scrub initiated");
                    return ScheduleResult::ScrubInitiated;
                }
                InitiateResult::NoLocalResources => {
                    debug!(%pgid, "local scrub resources exhausted");
                    return ScheduleResult::NoLocalResources;
                }
                skipped @ (InitiateResult::AlreadyStarted
                | InitiateResult::NoSuchPg
                | InitiateResult::BadPgState
                | InitiateResult::Preconditions) => {
                    debug!(%pgid, result = %skipped, "candidate skipped");
                }
            }
        }

        ScheduleResult::NoneReady
    }
}

/// Delay before a newly penalized job becomes eligible again
fn penalty_delay(config: &ScrubConfig) -> Duration {
    config
        .sleep
        .saturating_mul(2)
        .saturating_add(config.penalty_grace)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
