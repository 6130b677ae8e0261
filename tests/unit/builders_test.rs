//! Tests for builder modules

use std::sync::Arc;
use std::time::Duration;

use prometheus_save_scheduler::builders::SaverBuilder;
use prometheus_save_scheduler::config::SaverConfig;
use prometheus_save_scheduler::core::SaverError;
use prometheus_save_scheduler::infra::{InMemoryWriter, ManualIdleService};
use prometheus_save_scheduler::runtime::TokioSpawner;

fn producer(_force: bool) -> Result<Vec<u32>, SaverError> {
    Ok(vec![1, 2, 3])
}

#[test]
fn test_builder_keeps_config() {
    let cfg = SaverConfig::new().with_active_interval(Duration::from_millis(500));
    let builder = SaverBuilder::<Vec<u32>>::new(cfg);
    assert_eq!(builder.config().active_interval_ms, 500);
}

#[test]
fn test_build_outside_runtime_fails() {
    let result = SaverBuilder::<Vec<u32>>::new(SaverConfig::default())
        .build(producer, InMemoryWriter::new());
    assert!(matches!(result, Err(SaverError::Backend(_))));
}

#[test]
fn test_build_with_explicit_spawner() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let scheduler = SaverBuilder::<Vec<u32>>::new(SaverConfig::default())
        .with_spawner(TokioSpawner::new(runtime.handle().clone()))
        .build(producer, InMemoryWriter::new())
        .unwrap();
    assert!(!scheduler.is_pending());
}

#[tokio::test]
async fn test_build_rejects_invalid_config() {
    let cfg = SaverConfig::new().with_active_interval(Duration::ZERO);
    let result = SaverBuilder::<Vec<u32>>::new(cfg).build(producer, InMemoryWriter::new());
    assert!(matches!(result, Err(SaverError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_build_subscribes_idle_service() {
    let service = Arc::new(ManualIdleService::new());
    let cfg = SaverConfig::new().with_idle_threshold(Duration::from_secs(42));
    let scheduler = SaverBuilder::<Vec<u32>>::new(cfg)
        .with_idle_service(service.clone())
        .build(producer, InMemoryWriter::new())
        .unwrap();

    assert_eq!(service.observer_count(), 1);
    assert_eq!(
        scheduler.idle_subscription().map(|s| s.threshold),
        Some(Duration::from_secs(42))
    );
}
