//! Shared harness for scheduler specs

#![allow(dead_code)]

pub use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
pub use pgscrub_core::{
    AdmissionPolicy, FakeClock, JobRegistry, JobState, LoadGate, NoLoadFacility, PgId, QueueKind,
    ResourceBudget, SchedParams, ScrubConfig, ScrubJob, SharedConfig,
};
pub use pgscrub_engine::{
    FakeInitiator, InitiateResult, ScheduleResult, Scheduler, SchedulerDeps, ScrubService,
};
pub use std::sync::Arc;
pub use std::time::Duration;

/// Fixed start time of every scenario: Tuesday 2023-11-14 22:13:20 UTC
pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Scrub intervals of one and two hours, no random spread
pub fn hourly_config() -> ScrubConfig {
    ScrubConfig::default()
        .with_intervals(Duration::from_secs(3600), Duration::from_secs(7200))
        .with_randomize_ratio(0.0)
        .with_max_scrubs(2)
}

/// A storage node with a scripted initiator, evaluated in UTC
pub struct Node {
    pub service: ScrubService<FakeClock, FakeInitiator>,
    pub initiator: FakeInitiator,
    pub clock: FakeClock,
    pub config: SharedConfig,
}

impl Node {
    pub fn new() -> Self {
        Self::with_config(hourly_config())
    }

    pub fn with_config(config: ScrubConfig) -> Self {
        let config = SharedConfig::new(config);
        let budget = Arc::new(ResourceBudget::new(config_max(&config)));
        let initiator = FakeInitiator::new().with_budget(Arc::clone(&budget));
        let clock = FakeClock::at(t0());
        let scheduler = Scheduler::new(SchedulerDeps {
            registry: Arc::new(JobRegistry::new(Arc::new(config.clone()))),
            policy: AdmissionPolicy::with_offset(
                LoadGate::with_cpus(NoLoadFacility, 1),
                FixedOffset::east_opt(0).unwrap(),
            ),
            config: Arc::new(config.clone()),
            clock: clock.clone(),
            initiator: initiator.clone(),
        });
        Self {
            service: ScrubService::new(scheduler, budget),
            initiator,
            clock,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        self.service.scheduler().registry()
    }

    /// Register a PG whose scrub came due `ago` before now
    pub fn ripe_pg(&self, seed: u32, ago: TimeDelta) -> Arc<ScrubJob> {
        let job = Arc::new(ScrubJob::new(PgId::new(1, seed)));
        let proposed = t0() - ago - TimeDelta::hours(1);
        self.registry().register(&job, &SchedParams::new(proposed));
        job
    }

    pub async fn tick(&self) -> ScheduleResult {
        self.service.tick_once().await
    }

    pub fn attempted(&self) -> Vec<PgId> {
        self.initiator.attempted()
    }
}

fn config_max(config: &SharedConfig) -> u32 {
    use pgscrub_core::ConfigSource;
    config.current().max_scrubs
}
