// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{DateTime, TimeDelta, Utc};

const HOUR: Duration = Duration::from_secs(3600);

fn base() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn config() -> ScrubConfig {
    ScrubConfig::default()
        .with_intervals(10 * HOUR, 100 * HOUR)
        .with_randomize_ratio(0.5)
}

#[test]
fn mandatory_scrub_passes_through() {
    let calc = TargetTimeCalculator::with_seed(7);
    let params = SchedParams::must(base()).with_min_interval(HOUR);

    let schedule = calc.adjust_target_time(&params, &config());

    assert_eq!(schedule.scheduled_at, base());
    assert_eq!(schedule.deadline, None);
}

#[test]
fn regular_scrub_lands_within_randomized_range() {
    let calc = TargetTimeCalculator::with_seed(7);
    let params = SchedParams::new(base());

    for _ in 0..100 {
        let schedule = calc.adjust_target_time(&params, &config());
        // [proposed + 10h, proposed + 15h)
        assert!(schedule.scheduled_at >= base() + TimeDelta::hours(10));
        assert!(schedule.scheduled_at < base() + TimeDelta::hours(15));
        assert_eq!(schedule.deadline, Some(base() + TimeDelta::hours(100)));
    }
}

#[test]
fn zero_ratio_is_exact() {
    let calc = TargetTimeCalculator::with_seed(1);
    let cfg = config().with_randomize_ratio(0.0);
    let schedule = calc.adjust_target_time(&SchedParams::new(base()), &cfg);
    assert_eq!(schedule.scheduled_at, base() + TimeDelta::hours(10));
}

#[test]
fn overrides_replace_configured_intervals() {
    let calc = TargetTimeCalculator::with_seed(1);
    let cfg = config().with_randomize_ratio(0.0);
    let params = SchedParams::new(base())
        .with_min_interval(2 * HOUR)
        .with_max_interval(4 * HOUR);

    let schedule = calc.adjust_target_time(&params, &cfg);
    assert_eq!(schedule.scheduled_at, base() + TimeDelta::hours(2));
    assert_eq!(schedule.deadline, Some(base() + TimeDelta::hours(4)));
}

#[test]
fn zero_override_falls_back_to_config() {
    let calc = TargetTimeCalculator::with_seed(1);
    let cfg = config().with_randomize_ratio(0.0);
    let params = SchedParams::new(base()).with_min_interval(Duration::ZERO);

    let schedule = calc.adjust_target_time(&params, &cfg);
    assert_eq!(schedule.scheduled_at, base() + TimeDelta::hours(10));
}

#[test]
fn zero_max_interval_means_no_deadline() {
    let calc = TargetTimeCalculator::with_seed(1);
    let cfg = config().with_intervals(10 * HOUR, Duration::ZERO);
    let schedule = calc.adjust_target_time(&SchedParams::new(base()), &cfg);
    assert_eq!(schedule.deadline, None);
}

#[test]
fn same_seed_same_schedule() {
    let a = TargetTimeCalculator::with_seed(42);
    let b = TargetTimeCalculator::with_seed(42);
    let params = SchedParams::new(base());
    assert_eq!(
        a.adjust_target_time(&params, &config()),
        b.adjust_target_time(&params, &config())
    );
}
