//! Tests for environment-based config loading
//!
//! These mutate the process environment, so every test is #[serial].

use dbchat_config::{ConfigError, DbConfig, LlmConfig};
use serial_test::serial;

const DB_KEYS: &[&str] = &[
    "MYSQL_HOST",
    "MYSQL_PORT",
    "MYSQL_USER",
    "MYSQL_PASSWORD",
    "MYSQL_DATABASE",
    "MYSQL_CHARSET",
    "MYSQL_COLLATION",
    "MYSQL_SQL_MODE",
    "MYSQL_CONNECT_TIMEOUT",
    "MYSQL_AUTOCOMMIT",
    "MYSQL_USE_SSL",
];

fn clear_db_env() {
    for key in DB_KEYS {
        std::env::remove_var(key);
    }
}

fn set_required() {
    std::env::set_var("MYSQL_USER", "analyst");
    std::env::set_var("MYSQL_PASSWORD", "secret");
    std::env::set_var("MYSQL_DATABASE", "energy");
}

#[test]
#[serial]
fn from_env_applies_defaults() {
    clear_db_env();
    set_required();

    let config = DbConfig::from_env().unwrap();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 3306);
    assert_eq!(config.charset, "utf8mb4");
    assert_eq!(config.collation, "utf8mb4_unicode_ci");
    assert_eq!(config.sql_mode, "TRADITIONAL");
    assert_eq!(config.connect_timeout, 30);
    assert!(config.autocommit);
    assert!(!config.use_ssl);
}

#[test]
#[serial]
fn from_env_reads_overrides() {
    clear_db_env();
    set_required();
    std::env::set_var("MYSQL_HOST", "db.internal");
    std::env::set_var("MYSQL_PORT", "3307");
    std::env::set_var("MYSQL_AUTOCOMMIT", "False");
    std::env::set_var("MYSQL_USE_SSL", "TRUE");

    let config = DbConfig::from_env().unwrap();
    assert_eq!(config.host, "db.internal");
    assert_eq!(config.port, 3307);
    assert!(!config.autocommit);
    assert!(config.use_ssl);
}

#[test]
#[serial]
fn missing_user_fails_with_key_name() {
    clear_db_env();
    std::env::set_var("MYSQL_PASSWORD", "secret");
    std::env::set_var("MYSQL_DATABASE", "energy");

    let err = DbConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar("MYSQL_USER")));
    assert!(err.to_string().contains("MYSQL_USER"));
}

#[test]
#[serial]
fn empty_required_value_counts_as_missing() {
    clear_db_env();
    set_required();
    std::env::set_var("MYSQL_DATABASE", "");

    let err = DbConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar("MYSQL_DATABASE")));
}

#[test]
#[serial]
fn unparsable_port_is_rejected() {
    clear_db_env();
    set_required();
    std::env::set_var("MYSQL_PORT", "not-a-port");

    let err = DbConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidVar { key: "MYSQL_PORT", .. }));
}

#[test]
#[serial]
fn out_of_range_port_is_rejected() {
    clear_db_env();
    set_required();
    std::env::set_var("MYSQL_PORT", "70000");

    assert!(DbConfig::from_env().is_err());
}

#[test]
#[serial]
fn zero_timeout_is_rejected() {
    clear_db_env();
    set_required();
    std::env::set_var("MYSQL_CONNECT_TIMEOUT", "0");

    let err = DbConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("timeout"));
}

#[test]
#[serial]
fn llm_config_requires_api_key() {
    std::env::remove_var("OPENAI_API_KEY");
    std::env::remove_var("OPENAI_MODEL");
    std::env::remove_var("OPENAI_API_BASE");
    std::env::remove_var("OPENAI_TEMPERATURE");

    let err = LlmConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar("OPENAI_API_KEY")));
}

#[test]
#[serial]
fn llm_config_defaults() {
    std::env::remove_var("OPENAI_MODEL");
    std::env::remove_var("OPENAI_API_BASE");
    std::env::remove_var("OPENAI_TEMPERATURE");
    std::env::set_var("OPENAI_API_KEY", "sk-test");

    let config = LlmConfig::from_env().unwrap();
    assert_eq!(config.model, "gpt-4");
    assert_eq!(config.api_base, None);
    assert!((config.temperature - 0.1).abs() < f32::EPSILON);
}

#[test]
#[serial]
fn llm_config_overrides() {
    std::env::set_var("OPENAI_API_KEY", "sk-test");
    std::env::set_var("OPENAI_MODEL", "gpt-4o");
    std::env::set_var("OPENAI_API_BASE", "http://localhost:8000/v1");
    std::env::set_var("OPENAI_TEMPERATURE", "0.7");

    let config = LlmConfig::from_env().unwrap();
    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.api_base.as_deref(), Some("http://localhost:8000/v1"));
    assert!((config.temperature - 0.7).abs() < f32::EPSILON);

    std::env::remove_var("OPENAI_MODEL");
    std::env::remove_var("OPENAI_API_BASE");
    std::env::remove_var("OPENAI_TEMPERATURE");
}
