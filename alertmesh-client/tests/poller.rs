use alertmesh_client::{spawn_poller, Backoff, PollSchedule};
use alertmesh_devkit::TestHarness;
use std::time::Duration;

async fn advance_to(ms: u64, start: tokio::time::Instant) {
    tokio::time::sleep_until(start + Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn refreshes_immediately_then_on_every_interval() {
    let harness = TestHarness::new();
    harness.transport.push_message("Kabir", "hi");
    let start = tokio::time::Instant::now();

    let poller = spawn_poller(harness.feed.clone(), PollSchedule::default());

    advance_to(10, start).await;
    assert_eq!(harness.transport.fetch_count(), 1);
    assert_eq!(harness.feed.messages().len(), 1);

    advance_to(2_010, start).await;
    assert_eq!(harness.transport.fetch_count(), 2);
    advance_to(6_010, start).await;
    assert_eq!(harness.transport.fetch_count(), 4);

    poller.stop();
}

#[tokio::test(start_paused = true)]
async fn slow_refresh_does_not_delay_the_next_tick() {
    let harness = TestHarness::new();
    harness.transport.script_lines(&[], Duration::from_secs(5));
    let start = tokio::time::Instant::now();

    let _poller = spawn_poller(harness.feed.clone(), PollSchedule::default());

    advance_to(2_010, start).await;
    assert_eq!(harness.transport.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn stopping_ends_the_timer() {
    let harness = TestHarness::new();
    let start = tokio::time::Instant::now();

    let poller = spawn_poller(harness.feed.clone(), PollSchedule::fixed(Duration::from_secs(1)));
    advance_to(10, start).await;
    assert!(poller.is_running());
    poller.stop();

    advance_to(10_000, start).await;
    assert_eq!(harness.transport.fetch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_polling() {
    let harness = TestHarness::new();
    let start = tokio::time::Instant::now();

    drop(spawn_poller(harness.feed.clone(), PollSchedule::default()));
    advance_to(10_000, start).await;
    assert!(harness.transport.fetch_count() <= 1);
}

#[tokio::test(start_paused = true)]
async fn backoff_stretches_the_interval_while_failing() {
    let harness = TestHarness::new();
    harness.transport.set_fail_fetches(true);
    let start = tokio::time::Instant::now();
    let schedule = PollSchedule {
        interval: Duration::from_secs(1),
        backoff: Some(Backoff { multiplier: 2.0, max_interval: Duration::from_secs(8) }),
    };

    let _poller = spawn_poller(harness.feed.clone(), schedule);

    // first failure already doubles the wait: ticks at 0, 2, 6, 14
    for (at, expected) in [
        (500, 1),
        (1_500, 1),
        (2_500, 2),
        (5_500, 2),
        (6_500, 3),
        (13_500, 3),
        (14_500, 4),
    ] {
        advance_to(at, start).await;
        assert_eq!(harness.transport.fetch_count(), expected, "at {at} ms");
    }
    assert_eq!(harness.feed.consecutive_failures(), 4);
}

#[tokio::test(start_paused = true)]
async fn recovery_returns_to_the_base_interval() {
    let harness = TestHarness::new();
    harness.transport.set_fail_fetches(true);
    let start = tokio::time::Instant::now();
    let schedule = PollSchedule {
        interval: Duration::from_secs(1),
        backoff: Some(Backoff { multiplier: 2.0, max_interval: Duration::from_secs(8) }),
    };

    let _poller = spawn_poller(harness.feed.clone(), schedule);
    advance_to(500, start).await;
    harness.transport.set_fail_fetches(false);

    // tick at 2 succeeds, so the next ones come at 3 and 4
    advance_to(2_500, start).await;
    assert_eq!(harness.feed.consecutive_failures(), 0);
    advance_to(4_500, start).await;
    assert_eq!(harness.transport.fetch_count(), 4);
}
