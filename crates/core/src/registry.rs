// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scrub job registry: the active and penalized queues
//!
//! Jobs live in one of two queues:
//! - **active**: candidates for the next scheduling tick
//! - **penalized**: jobs whose last attempt could not reserve replica
//!   resources; reconsidered after a timeout or a schedule update
//!
//! Removal is lazy. `unregister` only flips the job's state; the job is
//! dropped from its queue the next time that queue is scanned.

use crate::config::ConfigSource;
use crate::id::PgId;
use crate::job::{JobState, SchedParams, ScrubJob, ScrubJobDump};
use crate::target::TargetTimeCalculator;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, trace};

/// Which queue a job sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Active,
    Penalized,
}

/// Ripe jobs copied out of both queues, earliest first
#[derive(Debug, Default)]
pub struct RipeJobs {
    pub active: Vec<Arc<ScrubJob>>,
    pub penalized: Vec<Arc<ScrubJob>>,
}

/// Queue preparation performed at the start of a scheduling tick
#[derive(Debug, Clone, Copy)]
pub struct TickPrep {
    pub now: DateTime<Utc>,
    /// Return every penalized job to the active queue
    pub forgive_all: bool,
    /// When newly penalized jobs become eligible again
    pub penalty_timeout: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Queues {
    active: Vec<Arc<ScrubJob>>,
    penalized: Vec<Arc<ScrubJob>>,
}

impl Queues {
    fn scan_penalized(&mut self, forgive_all: bool, now: DateTime<Utc>) -> usize {
        // drop deleted PGs and those we are no longer primary for
        reap(&mut self.penalized);

        let forgiven: Vec<_> = if forgive_all {
            std::mem::take(&mut self.penalized)
        } else {
            let (forgiven, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.penalized)
                .into_iter()
                .partition(|job| {
                    job.is_updated() || job.penalty_timeout().is_some_and(|t| t <= now)
                });
            self.penalized = kept;
            forgiven
        };

        let count = forgiven.len();
        self.active.extend(forgiven);
        trace!(
            restored = count,
            still_penalized = self.penalized.len(),
            forgive_all,
            "penalized jobs screened"
        );
        count
    }

    fn clear_updated(&self) {
        for job in &self.active {
            job.clear_updated();
        }
    }

    fn move_failed(&mut self, penalty_timeout: DateTime<Utc>) -> usize {
        let (failed, ok): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|job| job.resources_failure());
        self.active = ok;

        for job in &failed {
            debug!(pgid = %job.pgid(), state = %job.state(), "penalizing job");
            job.set_penalty_timeout(penalty_timeout);
            job.clear_resources_failure();
            // otherwise it would be forgiven on the very next tick
            job.clear_updated();
        }

        let count = failed.len();
        self.penalized.extend(failed);
        if count > 0 {
            debug!(count, "jobs penalized");
        }
        count
    }

    fn collect_ripe(&mut self, now: DateTime<Utc>) -> RipeJobs {
        RipeJobs {
            active: collect_ripe(&mut self.active, now),
            penalized: collect_ripe(&mut self.penalized, now),
        }
    }

    fn is_disjoint(&self) -> bool {
        !self
            .active
            .iter()
            .any(|a| self.penalized.iter().any(|p| Arc::ptr_eq(a, p)))
    }
}

/// Garbage-collect jobs that are no longer registered
fn reap(group: &mut Vec<Arc<ScrubJob>>) {
    for job in group.iter() {
        match job.state() {
            JobState::Unregistering => {
                job.set_in_queues(false);
                job.set_state(JobState::NotRegistered);
            }
            JobState::NotRegistered => job.set_in_queues(false),
            JobState::Registered => {}
        }
    }
    group.retain(|job| job.state() == JobState::Registered);
}

fn collect_ripe(group: &mut Vec<Arc<ScrubJob>>, now: DateTime<Utc>) -> Vec<Arc<ScrubJob>> {
    reap(group);

    let mut ripe: Vec<_> = group
        .iter()
        .filter_map(|job| {
            let scheduled_at = job.schedule().scheduled_at;
            if scheduled_at <= now {
                Some((scheduled_at, Arc::clone(job)))
            } else {
                trace!(pgid = %job.pgid(), %scheduled_at, "not ripe");
                None
            }
        })
        .collect();
    ripe.sort_by_key(|(scheduled_at, _)| *scheduled_at);
    ripe.into_iter().map(|(_, job)| job).collect()
}

/// Owns the scrub queues of one storage node
pub struct JobRegistry {
    queues: Mutex<Queues>,
    target: TargetTimeCalculator,
    config: Arc<dyn ConfigSource>,
}

impl JobRegistry {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self::with_target(config, TargetTimeCalculator::new())
    }

    pub fn with_target(config: Arc<dyn ConfigSource>, target: TargetTimeCalculator) -> Self {
        Self {
            queues: Mutex::new(Queues::default()),
            target,
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Queues> {
        self.queues.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update_job(&self, job: &ScrubJob, params: &SchedParams) {
        let adjusted = self.target.adjust_target_time(params, &self.config.current());
        job.update_schedule(adjusted);
    }

    /// Register a job, or refresh its schedule if already registered.
    ///
    /// Re-registration always wins over a pending unregistration.
    pub fn register(&self, job: &Arc<ScrubJob>, params: &SchedParams) {
        let state_at_entry = loop {
            let state_at_entry = job.state();
            trace!(pgid = %job.pgid(), state = %state_at_entry, "registering");

            match state_at_entry {
                JobState::Registered => {
                    self.update_job(job, params);
                }
                JobState::NotRegistered => {
                    let mut queues = self.lock();
                    if job.state() != state_at_entry {
                        drop(queues);
                        debug!(pgid = %job.pgid(), "scrub job state changed, retrying");
                        continue;
                    }

                    self.update_job(job, params);
                    queues.active.push(Arc::clone(job));
                    job.set_in_queues(true);
                    job.set_state(JobState::Registered);
                }
                JobState::Unregistering => {
                    // the job may be reaped from its queue at any moment
                    let mut queues = self.lock();

                    self.update_job(job, params);
                    if job.state() == JobState::NotRegistered {
                        debug!(pgid = %job.pgid(), "scrub job was reaped, re-queueing");
                        queues.active.push(Arc::clone(job));
                    }
                    job.set_in_queues(true);
                    job.set_state(JobState::Registered);
                }
            }
            break state_at_entry;
        };

        info!(
            pgid = %job.pgid(),
            from = %state_at_entry,
            to = %job.state(),
            scheduled_at = %job.schedule().scheduled_at,
            "scrub job registered"
        );
    }

    /// Mark a registered job for removal from the queues.
    ///
    /// A job that is not currently registered is left untouched.
    pub fn unregister(&self, job: &ScrubJob) {
        match job.compare_exchange_state(JobState::Registered, JobState::Unregistering) {
            Ok(_) => info!(
                pgid = %job.pgid(),
                from = %JobState::Registered,
                to = %JobState::Unregistering,
                "scrub job unregistering"
            ),
            Err(observed) => debug!(
                pgid = %job.pgid(),
                state = %observed,
                "unregister ignored, job not registered"
            ),
        }
    }

    /// Return penalized jobs to the active queue: all of them if
    /// `forgive_all`, otherwise those updated or past their penalty timeout.
    pub fn scan_penalized(&self, forgive_all: bool, now: DateTime<Utc>) -> usize {
        self.lock().scan_penalized(forgive_all, now)
    }

    /// Clear the `updated` flag of every active job
    pub fn clear_updated(&self) {
        self.lock().clear_updated();
    }

    /// Move active jobs whose last attempt failed on replica resources into
    /// the penalized queue.
    pub fn move_failed_jobs(&self, penalty_timeout: DateTime<Utc>) -> usize {
        self.lock().move_failed(penalty_timeout)
    }

    /// Reap both queues and copy out their ripe jobs, earliest first.
    pub fn collect_ripe_jobs(&self, now: DateTime<Utc>) -> RipeJobs {
        self.lock().collect_ripe(now)
    }

    /// All queue preparation for one tick, under a single lock.
    pub fn prepare_tick(&self, prep: TickPrep) -> RipeJobs {
        let mut queues = self.lock();
        debug!(
            active = queues.active.len(),
            penalized = queues.penalized.len(),
            "preparing scrub tick"
        );

        queues.scan_penalized(prep.forgive_all, prep.now);
        queues.clear_updated();
        queues.move_failed(prep.penalty_timeout);
        let ripe = queues.collect_ripe(prep.now);

        debug_assert!(queues.is_disjoint(), "job present in both scrub queues");
        ripe
    }

    /// Which queue currently holds the job for `pgid`, if any
    pub fn queue_of(&self, pgid: PgId) -> Option<QueueKind> {
        let queues = self.lock();
        if queues.active.iter().any(|job| job.pgid() == pgid) {
            Some(QueueKind::Active)
        } else if queues.penalized.iter().any(|job| job.pgid() == pgid) {
            Some(QueueKind::Penalized)
        } else {
            None
        }
    }

    pub fn find(&self, pgid: PgId) -> Option<Arc<ScrubJob>> {
        let queues = self.lock();
        queues
            .active
            .iter()
            .chain(queues.penalized.iter())
            .find(|job| job.pgid() == pgid)
            .cloned()
    }

    pub fn active_len(&self) -> usize {
        self.lock().active.len()
    }

    pub fn penalized_len(&self) -> usize {
        self.lock().penalized.len()
    }

    /// Registered jobs from both queues
    pub fn list_registered_jobs(&self) -> Vec<Arc<ScrubJob>> {
        let queues = self.lock();
        queues
            .active
            .iter()
            .chain(queues.penalized.iter())
            .filter(|job| job.is_registered())
            .cloned()
            .collect()
    }

    /// Diagnostic listing of every queued job, active queue first
    pub fn dump(&self) -> Vec<ScrubJobDump> {
        let queues = self.lock();
        queues
            .active
            .iter()
            .chain(queues.penalized.iter())
            .map(|job| job.dump())
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
