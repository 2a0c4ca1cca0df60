//! Registration lifecycle specs
//!
//! Verify register / unregister transitions as seen by the scheduler.

use crate::prelude::*;

#[test]
fn unregistering_unregistered_pg_is_noop() {
    let node = Node::new();
    let job = Arc::new(ScrubJob::new(PgId::new(3, 0x2a)));

    node.registry().unregister(&job);

    assert_eq!(job.state(), JobState::NotRegistered);
    assert!(!job.in_queues());
    assert!(node.registry().list_registered_jobs().is_empty());
}

#[tokio::test]
async fn unregistered_pg_is_reaped_not_scrubbed() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    node.registry().unregister(&a);
    assert_eq!(a.state(), JobState::Unregistering);

    assert_eq!(node.tick().await, ScheduleResult::NoneReady);

    assert!(node.attempted().is_empty());
    assert_eq!(a.state(), JobState::NotRegistered);
    assert_eq!(node.registry().queue_of(a.pgid()), None);
}

#[tokio::test]
async fn reregistration_wins_over_pending_removal() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    node.registry().unregister(&a);
    node.registry()
        .register(&a, &SchedParams::new(t0() - TimeDelta::hours(2)));

    assert_eq!(node.tick().await, ScheduleResult::ScrubInitiated);
    assert_eq!(node.attempted(), vec![a.pgid()]);
    assert_eq!(node.registry().active_len(), 1);
}

#[test]
fn scheduling_state_reflects_queue_status() {
    let node = Node::new();
    let a = node.ripe_pg(1, TimeDelta::minutes(10));
    let later = node.ripe_pg(2, TimeDelta::minutes(-10));

    assert_eq!(a.scheduling_state(t0(), true), "queued for deep scrub");
    assert!(later
        .scheduling_state(t0(), false)
        .starts_with("scrub scheduled @ "));

    node.registry().unregister(&a);
    assert_eq!(a.scheduling_state(t0(), false), "no scrub is scheduled");
}
