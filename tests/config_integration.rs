use mindbridge::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("MINDBRIDGE_SERVER__PORT");
        env::remove_var("MINDBRIDGE_WIDGET__API_URL");
        env::remove_var("MINDBRIDGE_WIDGET__HISTORY_CAPACITY");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["mindbridge"]).expect("defaults should load");
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.max_sessions, 10_000);
    assert_eq!(config.widget.api_url, "http://127.0.0.1:5000");
    assert_eq!(config.widget.request_timeout_secs, 10);
    assert_eq!(config.widget.history_capacity, 100);
    assert_eq!(config.widget.health_interval_secs, 15);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("MINDBRIDGE_SERVER__PORT", "9090");
        env::set_var("MINDBRIDGE_WIDGET__HISTORY_CAPACITY", "5");
    }

    let config = AppConfig::load_from_args(["mindbridge"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.widget.history_capacity, 5);

    clear_env_vars();
}

#[test]
#[serial]
fn test_port_variable() {
    clear_env_vars();
    unsafe {
        env::set_var("PORT", "8123");
    }

    let config = AppConfig::load_from_args(["mindbridge"]).expect("Failed to load config");
    assert_eq!(config.server.port, 8123);

    let config =
        AppConfig::load_from_args(["mindbridge", "serve"]).expect("Failed to load config");
    assert_eq!(config.server.port, 8123);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join("mindbridge.yaml");
    fs::write(
        &file_path,
        r#"
server:
  port: 7070
widget:
  api_url: "http://10.0.0.2:7070"
"#,
    )
    .expect("Failed to write temp config");

    unsafe {
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = AppConfig::load_from_args(["mindbridge"]).expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.widget.api_url, "http://10.0.0.2:7070");
    // Untouched keys keep their defaults.
    assert_eq!(config.server.host, "0.0.0.0");

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("MINDBRIDGE_SERVER__PORT", "9090");
        env::set_var("MINDBRIDGE_WIDGET__API_URL", "http://from-env:1");
    }

    let config = AppConfig::load_from_args(["mindbridge", "serve", "--port", "6001"])
        .expect("Failed to load config");
    assert_eq!(config.server.port, 6001);

    let config = AppConfig::load_from_args(["mindbridge", "chat", "--api-url", "http://cli:2"])
        .expect("Failed to load config");
    assert_eq!(config.widget.api_url, "http://cli:2");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["mindbridge", "--config", "/nonexistent/mindbridge.yaml"]);
    assert!(result.is_err());
}
