use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FlowError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FlowError::config("x").to_string().contains("config error:"));
    assert!(FlowError::parse("x").to_string().contains("parse error:"));
    assert!(FlowError::schema("x").to_string().contains("schema error:"));
    assert!(FlowError::service("x").to_string().contains("service error:"));
    assert!(
        FlowError::invalid_state("x")
            .to_string()
            .contains("invalid state:")
    );
    assert!(FlowError::io("x").to_string().contains("io error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FlowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_errors_convert_to_io_variant() {
    let err: FlowError = std::io::Error::other("disk full").into();
    assert!(matches!(err, FlowError::Io(ref m) if m.contains("disk full")));
}

#[test]
fn only_service_errors_are_retryable() {
    assert!(FlowError::service("timeout").is_retryable());
    assert!(!FlowError::config("no key").is_retryable());
    assert!(!FlowError::parse("bad json").is_retryable());
    assert!(!FlowError::schema("no title").is_retryable());
}
