//! Unit tests for TOML atomic write utilities
//!
//! Covers:
//! - Atomic file operations (temp + rename, no temp file left behind)
//! - Round trip of credentials and pipeline table
//! - Permissions 0600 on unix

use nameforge_common::config::{read_toml_config, write_toml_config, LoggingConfig, ProviderCredentials, TomlConfig};
#[cfg(unix)]
use nameforge_common::config::check_toml_permissions_loose;
use tempfile::TempDir;

fn sample_config() -> TomlConfig {
    let mut pipeline = toml::Table::new();
    pipeline.insert("attempt_multiplier".to_string(), toml::Value::Integer(8));

    TomlConfig {
        logging: LoggingConfig {
            level: "warn".to_string(),
        },
        providers: ProviderCredentials {
            lastfm_api_key: Some("key123".to_string()),
            spotify_token: None,
            llm_api_key: Some("llm-secret".to_string()),
            llm_base_url: None,
            llm_model: None,
        },
        pipeline: Some(pipeline),
    }
}

#[test]
fn test_atomic_write_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("test.toml");

    write_toml_config(&sample_config(), &target).unwrap();

    assert!(target.exists());
    assert!(!temp_dir.path().join("test.toml.tmp").exists());
}

#[test]
fn test_write_then_read_preserves_fields() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("nested").join("test.toml");

    let config = sample_config();
    write_toml_config(&config, &target).unwrap();

    let loaded = read_toml_config(&target).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_overwrite_replaces_previous_content() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("test.toml");

    write_toml_config(&sample_config(), &target).unwrap();

    let mut updated = sample_config();
    updated.providers.lastfm_api_key = Some("rotated".to_string());
    write_toml_config(&updated, &target).unwrap();

    let loaded = read_toml_config(&target).unwrap();
    assert_eq!(loaded.providers.lastfm_api_key.as_deref(), Some("rotated"));
}

#[cfg(unix)]
#[test]
fn test_written_file_is_owner_only() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("secret.toml");

    write_toml_config(&sample_config(), &target).unwrap();

    assert!(!check_toml_permissions_loose(&target).unwrap());
}
