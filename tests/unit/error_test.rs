//! Tests for error types

use prometheus_save_scheduler::core::SaverError;

#[test]
fn test_collect_error() {
    let err = SaverError::Collect("no windows".to_string());
    assert_eq!(format!("{}", err), "collect failed: no windows");
}

#[test]
fn test_write_error() {
    let err = SaverError::Write("disk full".to_string());
    assert_eq!(format!("{}", err), "write failed: disk full");
}

#[test]
fn test_unexpected_signal_error() {
    let err = SaverError::UnexpectedSignal("asleep".to_string());
    assert_eq!(format!("{}", err), "unexpected idle signal: asleep");
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let err: SaverError = io.into();
    assert_eq!(format!("{}", err), "io error: read-only");
}

#[test]
fn test_backend_error() {
    let err = SaverError::Backend("connection failed".to_string());
    assert_eq!(format!("{}", err), "backend error: connection failed");
}
