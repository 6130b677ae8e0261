//! Tests for tokio spawner and status utilities

use std::time::Duration;

use prometheus_save_scheduler::builders::SaverBuilder;
use prometheus_save_scheduler::config::SaverConfig;
use prometheus_save_scheduler::core::SaverError;
use prometheus_save_scheduler::infra::InMemoryWriter;
use prometheus_save_scheduler::runtime::{status, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::try_current().expect("inside runtime");

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_tokio_spawner_abort() {
    let spawner = TokioSpawner::try_current().expect("inside runtime");
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = spawner.spawn(async move {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        let _ = tx.send(());
    });
    handle.abort();

    assert!(rx.await.is_err(), "sender dropped by abort");
}

#[test]
fn test_try_current_outside_runtime() {
    assert!(TokioSpawner::try_current().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_status_snapshot() {
    let scheduler = SaverBuilder::<String>::new(SaverConfig::default())
        .build(
            |_force: bool| -> Result<String, SaverError> { Ok("state".into()) },
            InMemoryWriter::new(),
        )
        .unwrap();

    let before = status(&scheduler);
    assert!(!before.timer_armed);
    assert!(before.since_last_save_ms.is_none());

    scheduler.save_delayed(Duration::from_secs(5));
    scheduler.on_idle_state_changed(true);
    let pending = status(&scheduler);
    assert!(pending.timer_armed);
    assert!(pending.user_idle);
    assert_eq!(pending.stats.scheduled, 1);

    scheduler.save_now().await;
    tokio::time::advance(Duration::from_millis(250)).await;
    let after = status(&scheduler);
    assert!(!after.timer_armed);
    assert_eq!(after.since_last_save_ms, Some(250));
    assert_eq!(after.stats.writes_completed, 1);

    let json = serde_json::to_value(&after).unwrap();
    assert_eq!(json["config"]["idle_threshold_secs"], 180);
}
