//! Tests for configuration validation

use std::time::Duration;

use prometheus_save_scheduler::config::SaverConfig;

#[test]
fn test_default_config_is_valid() {
    let cfg = SaverConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.active_interval_ms, 15_000);
    assert_eq!(cfg.idle_interval_ms, 3_600_000);
    assert_eq!(cfg.idle_threshold_secs, 180);
    assert_eq!(cfg.default_delay_ms, 2_000);
}

#[test]
fn test_invalid_active_interval() {
    let cfg = SaverConfig::new().with_active_interval(Duration::ZERO);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_idle_interval() {
    let cfg = SaverConfig::new().with_idle_interval(Duration::ZERO);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_idle_threshold() {
    let cfg = SaverConfig::new().with_idle_threshold(Duration::from_millis(500));
    assert!(cfg.validate().is_err(), "sub-second thresholds truncate to zero");
}

#[test]
fn test_zero_default_delay_is_allowed() {
    let cfg = SaverConfig::new().with_default_delay(Duration::ZERO);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "active_interval_ms": 1000,
        "idle_interval_ms": 60000,
        "idle_threshold_secs": 30
    }"#;

    let cfg = SaverConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.active_interval(), Duration::from_secs(1));
    assert_eq!(cfg.idle_interval(), Duration::from_secs(60));
    assert_eq!(cfg.idle_threshold(), Duration::from_secs(30));
    assert_eq!(cfg.default_delay_ms, 2_000);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SaverConfig::from_json_str(r#"{ "active_interval_ms": 0 }"#).is_err());
    assert!(SaverConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_json_round_trip_fields() {
    let cfg = SaverConfig::new().with_idle_threshold(Duration::from_secs(90));
    let json = serde_json::to_value(cfg).unwrap();
    assert_eq!(json["idle_threshold_secs"], 90);
    assert_eq!(json["active_interval_ms"], 15_000);
}
