//! Tests for writer backends driven through the scheduler

use std::collections::BTreeMap;

use prometheus_save_scheduler::builders::SaverBuilder;
use prometheus_save_scheduler::config::SaverConfig;
use prometheus_save_scheduler::core::{SaveOutcome, SaverError};
use prometheus_save_scheduler::infra::AtomicFileWriter;

type Snapshot = BTreeMap<String, u64>;

#[tokio::test]
async fn test_scheduler_writes_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let writer = AtomicFileWriter::new(dir.path().join("session.json"));
    let reader = writer.clone();

    let scheduler = SaverBuilder::<Snapshot>::new(SaverConfig::default())
        .build(
            |force: bool| -> Result<Snapshot, SaverError> {
                let mut s = Snapshot::new();
                s.insert("forced".into(), u64::from(force));
                Ok(s)
            },
            writer,
        )
        .unwrap();

    assert_eq!(scheduler.save_now().await, SaveOutcome::Written);

    let stored: Snapshot = reader.read().await.unwrap().expect("file exists");
    assert_eq!(stored.get("forced"), Some(&1));
    assert!(!reader.temp_path().exists());
}

#[tokio::test]
async fn test_unwritable_target_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    let writer = AtomicFileWriter::new(blocker.join("session.json"));

    let scheduler = SaverBuilder::<Snapshot>::new(SaverConfig::default())
        .build(|_force: bool| -> Result<Snapshot, SaverError> { Ok(Snapshot::new()) }, writer)
        .unwrap();

    let outcome = scheduler.save_now().await;
    assert!(matches!(outcome, SaveOutcome::Failed(_)));
    assert_eq!(scheduler.stats().writes_failed, 1);
}
