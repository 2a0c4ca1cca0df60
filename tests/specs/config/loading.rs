//! Configuration specs
//!
//! Verify TOML loading and that running nodes pick up changes.

use crate::prelude::*;
use pgscrub_core::ConfigError;

#[test]
fn load_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scrub.toml");
    std::fs::write(
        &path,
        r#"
max_scrubs = 3
min_interval = "12h"
max_interval = "3days"
sleep = "10s"
begin_hour = 22
end_hour = 6
"#,
    )
    .unwrap();

    let config = ScrubConfig::load(&path).unwrap();

    assert_eq!(config.max_scrubs, 3);
    assert_eq!(config.min_interval, Duration::from_secs(12 * 3600));
    assert_eq!(config.max_interval, Duration::from_secs(3 * 86400));
    assert_eq!(config.sleep, Duration::from_secs(10));
    assert_eq!((config.begin_hour, config.end_hour), (22, 6));
    // unspecified keys keep their defaults
    assert_eq!(config.penalty_grace, Duration::from_secs(300));
    assert_eq!(config.load_threshold, 0.5);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScrubConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn out_of_range_hour_is_rejected() {
    let err = ScrubConfig::from_toml_str("end_hour = 24").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid value 24 for end_hour: expected 0..=23"
    );
}

#[tokio::test]
async fn updated_config_applies_to_next_tick() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    node.initiator.set_outcome(a.pgid(), InitiateResult::AlreadyStarted);
    node.tick().await;
    assert_eq!(node.attempted().len(), 1);

    node.config.update(hourly_config().with_hours(1, 5));
    assert_eq!(node.tick().await, ScheduleResult::NoneReady);
    assert_eq!(node.attempted().len(), 1);

    node.config.update(hourly_config().with_max_scrubs(4));
    node.tick().await;
    assert_eq!(node.service.budget().max_scrubs, 4);
}
