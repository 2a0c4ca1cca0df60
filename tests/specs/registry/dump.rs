//! Diagnostics specs
//!
//! Verify the JSON rendering of the scrub queues and the budget.

use crate::prelude::*;
use pgscrub_core::must_scrub_stamp;
use similar_asserts::assert_eq;

#[test]
fn queue_dump_renders_as_json() {
    let node = Node::new();
    node.ripe_pg(0x1f, TimeDelta::minutes(0));
    let forced = Arc::new(ScrubJob::new(PgId::new(2, 0)));
    node.registry()
        .register(&forced, &SchedParams::must(must_scrub_stamp()));

    let json = serde_json::to_value(node.registry().dump()).unwrap();

    assert_eq!(
        json,
        serde_json::json!([
            {
                "pgid": "1.1f",
                "sched_time": "2023-11-14T22:13:20Z",
                "deadline": "2023-11-14T23:13:20Z",
                "forced": false
            },
            {
                "pgid": "2.0",
                "sched_time": "1970-01-01T00:00:01.000000001Z",
                "deadline": null,
                "forced": true
            }
        ])
    );
}

#[tokio::test]
async fn budget_snapshot_renders_as_json() {
    let node = Node::new();
    node.ripe_pg(1, TimeDelta::minutes(1));
    node.tick().await;

    let json = serde_json::to_value(node.service.budget()).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "scrubs_local": 1,
            "scrubs_remote": 0,
            "max_scrubs": 2
        })
    );
}
