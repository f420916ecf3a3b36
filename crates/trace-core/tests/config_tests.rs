//! Tests for trace configuration loading

use std::io::Write;

use xslt_trace_core::{BuiltInRulePolicy, DetailLevel, Error, TraceConfig};

#[test]
fn test_defaults() {
    let config = TraceConfig::default();
    assert_eq!(config.detail_level, DetailLevel::High);
    assert_eq!(config.built_in_rules, BuiltInRulePolicy::Skip);
    assert!(config.show_separator);
    assert_eq!(config.report_name, "XSLT Trace");
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = TraceConfig::from_json_str(r#"{"detail_level": 1, "built_in_rules": "emit"}"#)
        .unwrap();
    assert_eq!(config.detail_level, DetailLevel::Low);
    assert_eq!(config.built_in_rules, BuiltInRulePolicy::Emit);
    assert!(config.show_separator);
    assert_eq!(config.report_name, "XSLT Trace");
}

#[test]
fn test_invalid_detail_level_is_rejected() {
    let result = TraceConfig::from_json_str(r#"{"detail_level": 7}"#);
    assert!(matches!(result, Err(Error::InvalidDetailLevel(7))));
}

#[test]
fn test_unknown_field_is_a_config_error() {
    let result = TraceConfig::from_json_str(r#"{"detial_level": 2}"#);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"show_separator": false, "report_name": "Nightly"}}"#
    )
    .unwrap();

    let config = TraceConfig::from_path(file.path()).unwrap();
    assert!(!config.show_separator);
    assert_eq!(config.report_name, "Nightly");
    assert_eq!(config.detail_level, DetailLevel::High);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = TraceConfig::from_path(dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_detail_level_conversions() {
    assert_eq!(DetailLevel::try_from(2u8).unwrap(), DetailLevel::Normal);
    assert!(matches!(
        DetailLevel::try_from(4u8),
        Err(Error::InvalidDetailLevel(4))
    ));
    assert_eq!(u8::from(DetailLevel::None), 0);
}
