//! Unit tests for configuration resolution and graceful degradation
//!
//! Covers:
//! - Config path priority: CLI argument → environment variable → platform default
//! - Missing or malformed TOML files fall back to defaults
//! - Provider credentials and the raw `[pipeline]` table survive parsing
//!
//! Note: Tests that manipulate NAMEFORGE_CONFIG are marked #[serial] so they
//! do not race each other.

use nameforge_common::config::{
    load_toml_config, read_toml_config, ConfigPathResolver, LoggingConfig, TomlConfig,
    CONFIG_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_wins_over_environment() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/nameforge-env.toml");

    let resolver = ConfigPathResolver::new(Some(PathBuf::from("/tmp/nameforge-cli.toml")));
    assert_eq!(
        resolver.resolve(),
        Some(PathBuf::from("/tmp/nameforge-cli.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_environment_variable_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/nameforge-env.toml");

    let resolver = ConfigPathResolver::new(None);
    assert_eq!(
        resolver.resolve(),
        Some(PathBuf::from("/tmp/nameforge-env.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_environment_variable_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let resolver = ConfigPathResolver::new(None);
    let resolved = resolver.resolve();
    assert_ne!(resolved, Some(PathBuf::from("   ")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_missing_path_yields_defaults() {
    let config = load_toml_config(None);
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_nonexistent_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    let config = load_toml_config(Some(&missing));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "logging = [this is not toml").unwrap();

    assert!(read_toml_config(&path).is_err());
    let config = load_toml_config(Some(&path));
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_full_config_parses() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nameforge.toml");
    std::fs::write(
        &path,
        r#"
[logging]
level = "debug"

[providers]
lastfm_api_key = "lfm-key"
llm_model = "grok-2"

[pipeline]
attempt_multiplier = 12

[pipeline.filter]
recent_reject_probability = 0.4
"#,
    )
    .unwrap();

    let config = read_toml_config(&path).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.providers.lastfm_api_key.as_deref(), Some("lfm-key"));
    assert_eq!(config.providers.llm_model.as_deref(), Some("grok-2"));
    assert!(config.providers.spotify_token.is_none());

    let pipeline = config.pipeline.expect("pipeline table present");
    assert_eq!(
        pipeline.get("attempt_multiplier").and_then(|v| v.as_integer()),
        Some(12)
    );
    assert!(pipeline.get("filter").is_some());
}

#[test]
fn test_partial_logging_section_uses_default_level() {
    let config: TomlConfig = toml::from_str("[logging]\n").unwrap();
    assert_eq!(config.logging.level, "info");
}
