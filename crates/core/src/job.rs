// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-PG scrub job record
//!
//! A `ScrubJob` is shared (`Arc`) between the lifecycle owner of the PG and
//! the [`JobRegistry`](crate::registry::JobRegistry) queues. Its registration
//! state is an atomic so that register/unregister calls racing with a
//! scheduling tick resolve without a global lock.

use crate::id::PgId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;
use tracing::info;

/// Registration state of a job with respect to the scheduling queues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Not in any queue
    NotRegistered,
    /// In the active or penalized queue
    Registered,
    /// Marked for removal; dropped from its queue on the next scan
    Unregistering,
}

impl JobState {
    fn as_u8(self) -> u8 {
        match self {
            JobState::NotRegistered => 0,
            JobState::Registered => 1,
            JobState::Unregistering => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => JobState::Registered,
            2 => JobState::Unregistering,
            _ => JobState::NotRegistered,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::NotRegistered => "not registered",
            JobState::Registered => "registered",
            JobState::Unregistering => "unregistering",
        };
        f.write_str(s)
    }
}

/// Whether a scrub was explicitly requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MustScrub {
    #[default]
    NotMandatory,
    Mandatory,
}

/// Scheduling input supplied by the PG when (re)registering
#[derive(Debug, Clone, PartialEq)]
pub struct SchedParams {
    /// Base time the scrub is computed from (usually the last scrub stamp)
    pub proposed_time: DateTime<Utc>,
    /// Per-pool override of the configured minimum interval
    pub min_interval: Option<std::time::Duration>,
    /// Per-pool override of the configured maximum interval
    pub max_interval: Option<std::time::Duration>,
    pub is_must: MustScrub,
}

impl SchedParams {
    pub fn new(proposed_time: DateTime<Utc>) -> Self {
        Self {
            proposed_time,
            min_interval: None,
            max_interval: None,
            is_must: MustScrub::NotMandatory,
        }
    }

    /// A mandatory (operator-requested) scrub at `proposed_time`
    pub fn must(proposed_time: DateTime<Utc>) -> Self {
        Self {
            is_must: MustScrub::Mandatory,
            ..Self::new(proposed_time)
        }
    }

    pub fn with_min_interval(mut self, interval: std::time::Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    pub fn with_max_interval(mut self, interval: std::time::Duration) -> Self {
        self.max_interval = Some(interval);
        self
    }
}

/// When a job should next be scrubbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub scheduled_at: DateTime<Utc>,
    /// Past this point the scrub ignores load and time-window restrictions
    pub deadline: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn new(scheduled_at: DateTime<Utc>, deadline: Option<DateTime<Utc>>) -> Self {
        Self {
            scheduled_at,
            deadline,
        }
    }

    /// Is the job due at `now`?
    pub fn is_ripe(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at <= now
    }

    /// Has the deadline strictly passed at `now`? False if there is none.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| deadline < now)
    }
}

/// Timestamp marking a schedule forced by an explicit operator request
pub fn must_scrub_stamp() -> DateTime<Utc> {
    DateTime::from_timestamp(1, 1).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[derive(Debug)]
struct Timing {
    schedule: Schedule,
    penalty_timeout: Option<DateTime<Utc>>,
}

/// Scheduling record of a single PG
#[derive(Debug)]
pub struct ScrubJob {
    pgid: PgId,
    state: AtomicU8,
    timing: Mutex<Timing>,
    resources_failure: AtomicBool,
    updated: AtomicBool,
    in_queues: AtomicBool,
}

impl ScrubJob {
    pub fn new(pgid: PgId) -> Self {
        Self {
            pgid,
            state: AtomicU8::new(JobState::NotRegistered.as_u8()),
            timing: Mutex::new(Timing {
                schedule: Schedule::new(DateTime::<Utc>::UNIX_EPOCH, None),
                penalty_timeout: None,
            }),
            resources_failure: AtomicBool::new(false),
            updated: AtomicBool::new(false),
            in_queues: AtomicBool::new(false),
        }
    }

    pub fn pgid(&self) -> PgId {
        self.pgid
    }

    pub fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(crate) fn set_state(&self, state: JobState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    /// Atomically move from `current` to `new`.
    ///
    /// On failure returns the state actually observed.
    pub(crate) fn compare_exchange_state(
        &self,
        current: JobState,
        new: JobState,
    ) -> Result<JobState, JobState> {
        self.state
            .compare_exchange(
                current.as_u8(),
                new.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map(JobState::from_u8)
            .map_err(JobState::from_u8)
    }

    pub fn is_registered(&self) -> bool {
        self.state() == JobState::Registered
    }

    pub fn schedule(&self) -> Schedule {
        self.timing.lock().unwrap_or_else(|e| e.into_inner()).schedule
    }

    /// Install a freshly computed schedule and flag the job as updated.
    pub fn update_schedule(&self, adjusted: Schedule) {
        {
            let mut timing = self.timing.lock().unwrap_or_else(|e| e.into_inner());
            timing.schedule = adjusted;
            timing.penalty_timeout = None;
        }
        // Cleared only by the scheduler after penalized jobs are screened.
        self.updated.store(true, Ordering::SeqCst);

        info!(
            pgid = %self.pgid,
            scheduled_at = %adjusted.scheduled_at,
            state = %self.state(),
            "schedule adjusted"
        );
    }

    pub fn penalty_timeout(&self) -> Option<DateTime<Utc>> {
        self.timing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .penalty_timeout
    }

    pub(crate) fn set_penalty_timeout(&self, timeout: DateTime<Utc>) {
        self.timing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .penalty_timeout = Some(timeout);
    }

    /// Record that the last scrub attempt could not reserve replica resources.
    pub fn mark_resources_failure(&self) {
        self.resources_failure.store(true, Ordering::SeqCst);
    }

    pub fn resources_failure(&self) -> bool {
        self.resources_failure.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_resources_failure(&self) {
        self.resources_failure.store(false, Ordering::SeqCst);
    }

    pub fn is_updated(&self) -> bool {
        self.updated.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_updated(&self) {
        self.updated.store(false, Ordering::SeqCst);
    }

    pub fn in_queues(&self) -> bool {
        self.in_queues.load(Ordering::SeqCst)
    }

    pub(crate) fn set_in_queues(&self, in_queues: bool) {
        self.in_queues.store(in_queues, Ordering::SeqCst);
    }

    /// Human-readable scheduling status, as shown by PG queries.
    pub fn scheduling_state(&self, now: DateTime<Utc>, is_deep_expected: bool) -> String {
        if !self.is_registered() {
            return "no scrub is scheduled".to_string();
        }

        let deep = if is_deep_expected { "deep " } else { "" };
        let schedule = self.schedule();
        // penalized jobs are reported as queued as well
        if now > schedule.scheduled_at {
            return format!("queued for {}scrub", deep);
        }
        format!("{}scrub scheduled @ {}", deep, schedule.scheduled_at)
    }

    /// Diagnostic snapshot of this job
    pub fn dump(&self) -> ScrubJobDump {
        let schedule = self.schedule();
        ScrubJobDump {
            pgid: self.pgid,
            sched_time: schedule.scheduled_at,
            deadline: schedule.deadline,
            forced: schedule.scheduled_at == must_scrub_stamp(),
        }
    }
}

/// One entry of the scrub queue diagnostics listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrubJobDump {
    pub pgid: PgId,
    pub sched_time: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub forced: bool,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
