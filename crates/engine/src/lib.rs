// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Scrub scheduling engine: per-tick candidate selection and the tick loop

mod error;
mod initiator;
pub mod logging;
mod scheduler;
mod service;
mod traced;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use error::ServiceError;
pub use initiator::{InitiateResult, ScheduleResult, ScrubInitiator};
pub use logging::LogConfig;
pub use scheduler::{ScrubPreconds, Scheduler, SchedulerDeps, TickKnobs};
pub use service::{ScrubService, MIN_TICK_INTERVAL};
pub use traced::TracedInitiator;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeInitiator, InitiateCall};
