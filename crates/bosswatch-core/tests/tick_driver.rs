//! Tests for the async tick driver on a paused clock.

use std::time::Duration;

use bosswatch_core::{Config, SnapshotStore, TickDriver, Tracker, TrackerHandle};
use tempfile::TempDir;

fn handle(dir: &TempDir) -> TrackerHandle {
    let tracker = Tracker::new(
        &Config::default(),
        SnapshotStore::new(dir.path().join("timers.json")),
    )
    .unwrap();
    TrackerHandle::new(tracker)
}

#[tokio::test(start_paused = true)]
async fn test_driver_runs_one_pass_per_interval() {
    let dir = TempDir::new().unwrap();
    let tracker = handle(&dir);
    tracker.mark_killed("Subora", 3, None).unwrap();

    let driver = TickDriver::new(tracker.clone(), Duration::from_secs(1)).spawn();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(tracker.get_remaining("Subora", 3).unwrap(), 3597);
    driver.abort();
}

#[tokio::test(start_paused = true)]
async fn test_kill_between_passes_restarts_cleanly() {
    let dir = TempDir::new().unwrap();
    let tracker = handle(&dir);
    tracker.mark_killed("Nazrudin", 0, Some(5)).unwrap();

    let driver = TickDriver::new(tracker.clone(), Duration::from_secs(1)).spawn();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(tracker.get_remaining("Nazrudin", 0).unwrap(), 3);

    tracker.mark_killed("Nazrudin", 0, Some(5)).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(tracker.get_remaining("Nazrudin", 0).unwrap(), 4);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(tracker.get_remaining("Nazrudin", 0).unwrap(), 0);
    assert_eq!(
        tracker.history()[0],
        "Nazrudin on channel 1 is live again"
    );
    driver.abort();
}

#[tokio::test(start_paused = true)]
async fn test_driver_persists_each_pass() {
    let dir = TempDir::new().unwrap();
    let tracker = handle(&dir);
    tracker.mark_killed("Ultumuno", 2, Some(100)).unwrap();

    let driver = TickDriver::new(tracker.clone(), Duration::from_secs(1)).spawn();
    tokio::time::sleep(Duration::from_millis(4500)).await;
    driver.abort();

    let saved = SnapshotStore::new(dir.path().join("timers.json"))
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(saved.get("Ultumuno", 2), Some(96));
}
