//! Configuration loading and config-file resolution
//!
//! Resolution order for the config file path:
//! 1. Command-line argument (highest priority)
//! 2. `NAMEFORGE_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/nameforge/nameforge.toml`)
//!
//! A missing or malformed file never aborts startup: the loader logs a warning
//! and falls back to compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "NAMEFORGE_CONFIG";

/// Config file name inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "nameforge.toml";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing level (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Credentials and endpoints for the external providers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// Last.fm API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastfm_api_key: Option<String>,

    /// Spotify bearer token (client-credentials flow handled externally)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_token: Option<String>,

    /// API key for the LLM completion endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible completion API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_base_url: Option<String>,

    /// Model identifier sent with completion requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
}

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub providers: ProviderCredentials,

    /// Raw `[pipeline]` table; parsed by the generator crate into its own
    /// parameter struct so tuning keys stay next to the code they tune.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<toml::Table>,
}

/// Resolves which config file to read
pub struct ConfigPathResolver {
    cli_arg: Option<PathBuf>,
}

impl ConfigPathResolver {
    pub fn new(cli_arg: Option<PathBuf>) -> Self {
        Self { cli_arg }
    }

    /// Resolve the config path, or `None` when no candidate exists
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_arg {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        default_config_path().filter(|p| p.exists())
    }
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nameforge").join(CONFIG_FILE_NAME))
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load configuration with graceful degradation
///
/// Returns defaults (after logging a warning) when the path is absent,
/// unreadable, or not valid TOML.
pub fn load_toml_config(path: Option<&Path>) -> TomlConfig {
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return TomlConfig::default();
    };

    match read_toml_config(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Config file {} unusable ({}), using defaults", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Write configuration atomically (temp file + rename)
///
/// On unix the written file is restricted to 0600 since it may hold API keys.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// True when a config file is readable by group or others
#[cfg(unix)]
pub fn check_toml_permissions_loose(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(path)?.permissions().mode();
    Ok(mode & 0o077 != 0)
}
