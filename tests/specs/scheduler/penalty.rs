//! Penalized queue specs
//!
//! Verify how PGs that failed to reserve replica resources are held back
//! and reinstated.

use crate::prelude::*;

#[tokio::test]
async fn failed_reservation_moves_pg_to_penalized() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    let b = node.ripe_pg(2, TimeDelta::minutes(5));
    a.mark_resources_failure();

    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);

    assert_eq!(node.attempted(), vec![b.pgid()]);
    assert_eq!(node.registry().queue_of(a.pgid()), Some(QueueKind::Penalized));
    // default sleep is zero: penalty is the 300s grace
    assert_eq!(a.penalty_timeout(), Some(t0() + TimeDelta::seconds(300)));
}

#[tokio::test]
async fn elapsed_penalty_is_eligible_in_same_tick() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    let b = node.ripe_pg(2, TimeDelta::minutes(5));
    a.mark_resources_failure();
    node.tick().await;
    node.initiator.clear_calls();

    node.clock.advance(Duration::from_secs(300));
    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);

    // a is due earlier than b, so it goes first once reinstated
    assert_eq!(node.attempted(), vec![a.pgid()]);
    assert_ne!(node.attempted(), vec![b.pgid()]);
    assert_eq!(node.registry().queue_of(a.pgid()), Some(QueueKind::Active));
}

#[tokio::test]
async fn rescheduled_pg_is_forgiven_early() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    a.mark_resources_failure();
    node.registry().move_failed_jobs(t0() + TimeDelta::hours(1));

    node.registry()
        .register(&a, &SchedParams::new(t0() - TimeDelta::hours(2)));
    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);
    assert_eq!(node.registry().queue_of(a.pgid()), Some(QueueKind::Active));
}

#[tokio::test]
async fn penalized_pgs_are_tried_when_active_has_nothing() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    a.mark_resources_failure();
    node.registry().move_failed_jobs(t0() + TimeDelta::hours(1));

    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);
    assert_eq!(node.attempted(), vec![a.pgid()]);
    assert!(node.service.scheduler().restore_pending());

    // the following tick forgives every penalized PG
    node.tick().await;
    assert_eq!(node.registry().queue_of(a.pgid()), Some(QueueKind::Active));
    assert_eq!(node.registry().penalized_len(), 0);
}
