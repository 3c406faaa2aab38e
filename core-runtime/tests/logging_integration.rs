//! Integration tests for logging system

use bridge_traits::logging::LogLevel;
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};

#[test]
fn test_logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    assert!(init_logging(config.clone()).is_ok());
    // A global subscriber is already installed now
    assert!(init_logging(config).is_err());
}

#[test]
fn test_pii_redaction_tokens() {
    assert_eq!(
        redact_if_sensitive("access_token", "EwB4A8l6BAAU"),
        "[REDACTED]"
    );
    assert_eq!(
        redact_if_sensitive("refresh_token", "MCR3kPz!"),
        "[REDACTED]"
    );
    assert_eq!(redact_if_sensitive("client_secret", "s3cr3t"), "[REDACTED]");
}

#[test]
fn test_pii_redaction_emails() {
    let redacted = redact_if_sensitive("account", "user@outlook.com");

    assert!(redacted.starts_with('u'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("outlook.com"));
}

#[test]
fn test_pii_redaction_normal_values() {
    assert_eq!(redact_if_sensitive("item_id", "A1B2C3!105"), "A1B2C3!105");
    assert_eq!(redact_if_sensitive("name", "Documents"), "Documents");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/home/user/upload/photo.jpg"), "photo.jpg");
    assert_eq!(strip_path("D:\\data\\file.txt"), "file.txt");
    assert_eq!(strip_path("filename.txt"), "filename.txt");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
