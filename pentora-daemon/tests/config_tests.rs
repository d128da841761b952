//! Configuration loading and validation tests.
//!
//! Tests TOML parsing, environment variable overrides, partial configs, and validation.

use std::env;

use pentora_core::config::PentoraConfig;
use serial_test::serial;

#[test]
fn test_parse_full_config() {
    // Given: A complete TOML config
    let toml_str = r#"
[general]
log_level = "debug"
log_format = "json"
data_dir = "/var/lib/pentora"
pid_file = "/var/run/pentora.pid"

[tools]
nmap_path = "/usr/bin/nmap"
nikto_path = "/usr/bin/nikto"
hydra_path = "/usr/bin/hydra"
sqlmap_path = "/usr/bin/sqlmap"
gobuster_path = "/usr/bin/gobuster"
nmap_timeout_secs = 120
nikto_timeout_secs = 600

[scan]
max_concurrent_scans = 8
event_channel_capacity = 512

[advisory]
enabled = true
endpoint = "http://127.0.0.1:11434"
timeout_secs = 20

[metrics]
enabled = true
listen_addr = "127.0.0.1"
port = 9499
"#;

    // When: Parsing config
    let result = PentoraConfig::parse(toml_str);

    // Then: Should succeed
    assert!(result.is_ok(), "full config should parse successfully");
    let config = result.expect("config should parse");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.tools.nmap_path, "/usr/bin/nmap");
    assert_eq!(config.tools.nmap_timeout_secs, 120);
    assert_eq!(config.scan.max_concurrent_scans, 8);
    assert_eq!(config.scan.event_channel_capacity, 512);
    assert!(config.advisory.enabled);
    assert_eq!(config.advisory.timeout_secs, 20);
    assert!(config.metrics.enabled);
    assert_eq!(config.metrics.port, 9499);
}

#[test]
fn test_parse_partial_config_uses_defaults() {
    // Given: A config with only one section
    let toml_str = r#"
[scan]
max_concurrent_scans = 2
"#;

    // When: Parsing config
    let config = PentoraConfig::parse(toml_str).expect("partial config should parse");

    // Then: Missing sections fall back to defaults
    assert_eq!(config.scan.max_concurrent_scans, 2);
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.tools.nmap_timeout_secs, 300);
    assert!(!config.advisory.enabled);
    assert!(!config.metrics.enabled);
}

#[test]
fn test_parse_empty_config_is_all_defaults() {
    // Given: An empty TOML document
    let config = PentoraConfig::parse("").expect("empty config should parse");

    // Then: Every section has its default values
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.scan.max_concurrent_scans, 4);
    assert_eq!(config.scan.event_channel_capacity, 256);
    assert_eq!(config.tools.nikto_timeout_secs, 900);
    assert_eq!(config.tools.hydra_timeout_secs, 1800);
}

#[test]
fn test_parse_invalid_toml_fails() {
    // Given: Malformed TOML
    let result = PentoraConfig::parse("[scan\nmax_concurrent_scans = ");

    // Then: Parsing fails with a config error
    assert!(result.is_err(), "malformed TOML should not parse");
}

#[test]
fn test_validate_rejects_unknown_log_level() {
    // Given: A config with a bogus log level
    let toml_str = r#"
[general]
log_level = "verbose"
"#;
    let config = PentoraConfig::parse(toml_str).expect("should parse");

    // When: Validating
    let result = config.validate();

    // Then: Validation fails
    assert!(result.is_err(), "unknown log level should fail validation");
}

#[test]
fn test_validate_rejects_zero_concurrency() {
    // Given: max_concurrent_scans = 0
    let toml_str = r#"
[scan]
max_concurrent_scans = 0
"#;
    let config = PentoraConfig::parse(toml_str).expect("should parse");

    // Then: Validation fails
    assert!(
        config.validate().is_err(),
        "zero concurrent scans should fail validation"
    );
}

#[test]
#[serial]
fn test_env_override_log_level() {
    // Given: A base config and environment variable
    let toml_str = r#"
[general]
log_level = "info"
"#;

    // SAFETY: Test isolation - we set and clean up env vars
    unsafe {
        env::set_var("PENTORA_GENERAL_LOG_LEVEL", "debug");
    }

    // When: Applying env overrides
    let mut config = PentoraConfig::parse(toml_str).expect("should parse");
    config.apply_env_overrides();

    // Then: Environment variable should override TOML value
    assert_eq!(
        config.general.log_level, "debug",
        "env var should override TOML value"
    );

    // Cleanup
    // SAFETY: Test cleanup
    unsafe {
        env::remove_var("PENTORA_GENERAL_LOG_LEVEL");
    }
}

#[test]
#[serial]
fn test_env_override_scan_concurrency() {
    // Given: Default scan section and an override
    // SAFETY: Test isolation
    unsafe {
        env::set_var("PENTORA_SCAN_MAX_CONCURRENT_SCANS", "16");
    }

    // When: Applying env overrides on an empty config
    let mut config = PentoraConfig::parse("").expect("should parse");
    config.apply_env_overrides();

    // Then: Should use env var value
    assert_eq!(config.scan.max_concurrent_scans, 16);

    // Cleanup
    // SAFETY: Test cleanup
    unsafe {
        env::remove_var("PENTORA_SCAN_MAX_CONCURRENT_SCANS");
    }
}

#[test]
#[serial]
fn test_env_override_no_env_var_keeps_toml() {
    // Given: Config without corresponding env var
    let toml_str = r#"
[general]
log_level = "warn"
"#;

    // When: Applying env overrides (no env vars set)
    let mut config = PentoraConfig::parse(toml_str).expect("should parse");
    config.apply_env_overrides();

    // Then: TOML value survives
    assert_eq!(config.general.log_level, "warn");
}

#[tokio::test]
async fn test_load_missing_file_fails() {
    // Given: A path that does not exist
    let result = PentoraConfig::load("/nonexistent/pentora.toml").await;

    // Then: Loading fails
    assert!(result.is_err(), "missing config file should fail to load");
}

#[tokio::test]
async fn test_load_from_file_round_trip() {
    // Given: A config file on disk
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("pentora.toml");
    std::fs::write(
        &path,
        r#"
[general]
log_level = "debug"

[scan]
max_concurrent_scans = 3
"#,
    )
    .expect("should write config file");

    // When: Loading
    let config = PentoraConfig::load(&path).await.expect("should load");

    // Then: File values are applied
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.scan.max_concurrent_scans, 3);
}
