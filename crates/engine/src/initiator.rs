// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scrub initiator interface and scheduling outcomes

use async_trait::async_trait;
use pgscrub_core::PgId;
use std::fmt;

/// Outcome of asking a PG to start a scrub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitiateResult {
    ScrubInitiated,
    /// A scrub of this PG is already running
    AlreadyStarted,
    /// The PG no longer exists on this node
    NoSuchPg,
    /// The PG is not in a state that can be scrubbed
    BadPgState,
    /// The node-wide scrub budget is exhausted
    NoLocalResources,
    /// PG-level preconditions (flags, pool settings) forbid the scrub
    Preconditions,
}

/// Starts scrubs on behalf of the scheduler.
///
/// The scheduler calls this on a snapshot of the queues, without holding
/// any lock, so a candidate may have been deleted or lost its primary role
/// since it was queued. Implementations must re-validate the PG themselves
/// and report `NoSuchPg` or `BadPgState` as appropriate.
///
/// Reserving local scrub resources is also the implementation's job; an
/// exhausted budget is reported as `NoLocalResources`.
#[async_trait]
pub trait ScrubInitiator: Send + Sync + 'static {
    async fn initiate_scrub(&self, pgid: &PgId, allow_requested_repair_only: bool)
        -> InitiateResult;
}

/// Result of one scheduling tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleResult {
    ScrubInitiated,
    /// No candidate was ripe, or none was accepted
    NoneReady,
    NoLocalResources,
    AlreadyStarted,
    NoSuchPg,
    BadPgState,
    Preconditions,
}

impl ScheduleResult {
    pub fn is_initiated(self) -> bool {
        self == ScheduleResult::ScrubInitiated
    }
}

impl From<InitiateResult> for ScheduleResult {
    fn from(result: InitiateResult) -> Self {
        match result {
            InitiateResult::ScrubInitiated => ScheduleResult::ScrubInitiated,
            InitiateResult::AlreadyStarted => ScheduleResult::AlreadyStarted,
            InitiateResult::NoSuchPg => ScheduleResult::NoSuchPg,
            InitiateResult::BadPgState => ScheduleResult::BadPgState,
            InitiateResult::NoLocalResources => ScheduleResult::NoLocalResources,
            InitiateResult::Preconditions => ScheduleResult::Preconditions,
        }
    }
}

impl fmt::Display for ScheduleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScheduleResult::ScrubInitiated => "scrubbing",
            ScheduleResult::NoneReady => "no ready job",
            ScheduleResult::NoLocalResources => "local resources shortage",
            ScheduleResult::AlreadyStarted => "denied as already started",
            ScheduleResult::NoSuchPg => "pg not found",
            ScheduleResult::BadPgState => "prevented by pg state",
            ScheduleResult::Preconditions => "preconditions not met",
        };
        f.write_str(s)
    }
}

impl fmt::Display for InitiateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ScheduleResult::from(*self).fmt(f)
    }
}
