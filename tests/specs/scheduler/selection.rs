//! Candidate selection specs
//!
//! Verify which PG a tick hands to the initiator, and in what order.

use crate::prelude::*;

#[tokio::test]
async fn initiated_pg_stays_in_active_queue() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(5));

    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);

    assert_eq!(node.attempted(), vec![a.pgid()]);
    assert_eq!(node.registry().queue_of(a.pgid()), Some(QueueKind::Active));
    assert_eq!(a.state(), JobState::Registered);
    assert_eq!(node.service.budget().scrubs_local, 1);
}

#[tokio::test]
async fn bad_pg_state_falls_through_to_next_candidate() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    let b = node.ripe_pg(2, TimeDelta::minutes(5));
    node.initiator.set_outcome(a.pgid(), InitiateResult::BadPgState);

    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);
    assert_eq!(node.attempted(), vec![a.pgid(), b.pgid()]);
}

#[tokio::test]
async fn no_local_resources_ends_the_tick() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    node.ripe_pg(2, TimeDelta::minutes(5));
    node.initiator.set_outcome(a.pgid(), InitiateResult::NoLocalResources);

    assert_eq!(node.tick().await, ScheduleResult::NoLocalResources);
    assert_eq!(node.attempted(), vec![a.pgid()]);
}

#[tokio::test]
async fn exhausted_budget_blocks_further_ticks() {
    let node = Node::with_config(hourly_config().with_max_scrubs(1));
    node.ripe_pg(1, TimeDelta::minutes(10));
    node.ripe_pg(2, TimeDelta::minutes(5));

    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);
    assert_eq!(node.tick().await, ScheduleResult::NoLocalResources);
    assert_eq!(node.service.budget().scrubs_local, 1);
}

#[tokio::test]
async fn nothing_ripe_is_none_ready() {
    let node = Node::new();
    node.ripe_pg(1, TimeDelta::minutes(-30));

    assert_eq!(node.tick().await, ScheduleResult::NoneReady);
    assert!(node.attempted().is_empty());

    node.clock.advance(Duration::from_secs(31 * 60));
    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);
}

#[tokio::test]
async fn outside_hours_only_overdue_pgs_start() {
    // 22:13 UTC is outside 01:00-05:00
    let node = Node::with_config(hourly_config().with_hours(1, 5));
    let recent = node.ripe_pg(1, TimeDelta::minutes(10));
    assert_eq!(node.tick().await, ScheduleResult::NoneReady);

    // deadline is proposed + 2h, i.e. one hour after coming due
    let overdue = node.ripe_pg(2, TimeDelta::minutes(90));
    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);
    assert_eq!(node.attempted(), vec![overdue.pgid()]);
    assert!(!node.attempted().contains(&recent.pgid()));
}
