// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pgscrub-core: scrub scheduling primitives for a storage node
//!
//! This crate provides:
//! - Per-PG scrub jobs and their registration state machine
//! - The job registry (active and penalized queues)
//! - The node-wide scrub resource budget
//! - Admission checks (time window, system load) and target time computation
//! - TOML-backed configuration

pub mod budget;
pub mod clock;
pub mod config;
pub mod id;
pub mod job;
pub mod load;
pub mod policy;
pub mod registry;
pub mod target;

pub use budget::{BudgetSnapshot, ResourceBudget, SlotKind};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, ConfigSource, ScrubConfig, SharedConfig};
pub use id::{ParsePgIdError, PgId};
pub use job::{
    must_scrub_stamp, JobState, MustScrub, SchedParams, Schedule, ScrubJob, ScrubJobDump,
};
pub use load::{FixedLoad, LoadGate, LoadSource, NoLoadFacility, ProcLoadAvg};
pub use policy::{in_window, AdmissionPolicy, ZoneOffset};
pub use registry::{JobRegistry, QueueKind, RipeJobs, TickPrep};
pub use target::TargetTimeCalculator;
