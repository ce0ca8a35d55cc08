//! Configuration resolution for nameforge-gen
//!
//! Provider credentials resolve with ENV → TOML priority. A missing
//! credential disables that provider only; the pipeline still runs on the
//! remaining providers and static vocabulary.

use crate::params::PipelineParams;
use crate::providers::datamuse::DatamuseClient;
use crate::providers::lastfm::LastFmClient;
use crate::providers::llm::LlmClient;
use crate::providers::spotify::SpotifyClient;
use crate::providers::{Provider, ProviderError, ProviderRegistry};
use nameforge_common::config::{
    default_config_path, load_toml_config, write_toml_config, ConfigPathResolver, TomlConfig,
};
use nameforge_common::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub const LASTFM_KEY_ENV: &str = "NAMEFORGE_LASTFM_API_KEY";
pub const SPOTIFY_TOKEN_ENV: &str = "NAMEFORGE_SPOTIFY_TOKEN";
pub const LLM_KEY_ENV: &str = "NAMEFORGE_LLM_API_KEY";

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve one credential: environment first, then TOML
///
/// Warns when both sources hold a usable value.
pub fn resolve_credential(label: &str, env_var: &str, toml_value: Option<&String>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_value = toml_value.filter(|k| is_valid_key(k));

    match (env_value, toml_value) {
        (Some(env), Some(_)) => {
            warn!(
                "{} found in environment and TOML config. Using environment (highest priority).",
                label
            );
            Some(env)
        }
        (Some(env), None) => {
            info!("{} loaded from environment variable", label);
            Some(env)
        }
        (None, Some(toml)) => {
            info!("{} loaded from TOML config", label);
            Some(toml.clone())
        }
        (None, None) => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedCredentials {
    pub lastfm_api_key: Option<String>,
    pub spotify_token: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
}

pub fn resolve_credentials(config: &TomlConfig) -> ResolvedCredentials {
    let providers = &config.providers;
    ResolvedCredentials {
        lastfm_api_key: resolve_credential(
            "Last.fm API key",
            LASTFM_KEY_ENV,
            providers.lastfm_api_key.as_ref(),
        ),
        spotify_token: resolve_credential(
            "Spotify token",
            SPOTIFY_TOKEN_ENV,
            providers.spotify_token.as_ref(),
        ),
        llm_api_key: resolve_credential("LLM API key", LLM_KEY_ENV, providers.llm_api_key.as_ref()),
        llm_base_url: providers.llm_base_url.clone(),
        llm_model: providers.llm_model.clone(),
    }
}

fn register_or_warn<P: Provider + 'static>(
    registry: &mut ProviderRegistry,
    name: &str,
    built: Result<P, ProviderError>,
) {
    match built {
        Ok(provider) => registry.register(Arc::new(provider)),
        Err(e) => warn!("{} disabled: {}", name, e),
    }
}

/// Registry of every provider the credentials allow
///
/// `offline` yields an empty registry, so every lookup falls straight
/// through to static vocabulary.
pub fn build_registry(credentials: &ResolvedCredentials, offline: bool) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    if offline {
        info!("Offline mode: no providers registered");
        return registry;
    }

    register_or_warn(&mut registry, "Datamuse", DatamuseClient::new());

    match &credentials.lastfm_api_key {
        Some(key) => register_or_warn(&mut registry, "Last.fm", LastFmClient::new(key.clone())),
        None => info!("Last.fm disabled: no API key (set {})", LASTFM_KEY_ENV),
    }

    match &credentials.spotify_token {
        Some(token) => register_or_warn(&mut registry, "Spotify", SpotifyClient::new(token.clone())),
        None => info!("Spotify disabled: no token (set {})", SPOTIFY_TOKEN_ENV),
    }

    match &credentials.llm_api_key {
        Some(key) => register_or_warn(
            &mut registry,
            "LLM",
            LlmClient::new(
                key.clone(),
                credentials.llm_base_url.clone(),
                credentials.llm_model.clone(),
            ),
        ),
        None => info!("LLM disabled: no API key (set {})", LLM_KEY_ENV),
    }

    info!(providers = ?registry.ids(), "Provider registry built");
    registry
}

/// Everything the binary needs from configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub log_level: String,
    pub credentials: ResolvedCredentials,
    pub pipeline: PipelineParams,
    pub source: Option<PathBuf>,
}

impl GeneratorConfig {
    pub fn from_toml(config: &TomlConfig, source: Option<PathBuf>) -> Self {
        Self {
            log_level: config.logging.level.clone(),
            credentials: resolve_credentials(config),
            pipeline: PipelineParams::from_optional_table(config.pipeline.as_ref()),
            source,
        }
    }
}

/// True when `config` holds a credential and the file at `path` is readable
/// by group or others
#[cfg(unix)]
pub fn credentials_exposed(path: &Path, config: &TomlConfig) -> bool {
    let p = &config.providers;
    let has_secret = [&p.lastfm_api_key, &p.spotify_token, &p.llm_api_key]
        .iter()
        .any(|k| k.as_deref().is_some_and(is_valid_key));
    has_secret && nameforge_common::config::check_toml_permissions_loose(path).unwrap_or(false)
}

#[cfg(not(unix))]
pub fn credentials_exposed(_path: &Path, _config: &TomlConfig) -> bool {
    false
}

/// Resolve the config path (CLI → ENV → platform dir) and load it,
/// falling back to defaults on any problem
pub fn load(cli_path: Option<PathBuf>) -> GeneratorConfig {
    let path = ConfigPathResolver::new(cli_path).resolve();
    let toml = load_toml_config(path.as_deref());
    if let Some(p) = path.as_deref() {
        if credentials_exposed(p, &toml) {
            warn!(
                "{} holds API credentials but is readable by other users (chmod 600 recommended)",
                p.display()
            );
        }
    }
    GeneratorConfig::from_toml(&toml, path)
}

/// Write a starter config holding every pipeline default
///
/// Targets `path`, or the platform config file when `None`. An existing file
/// is never overwritten.
pub fn write_default_config(path: Option<PathBuf>) -> Result<PathBuf, Error> {
    let path = path
        .or_else(default_config_path)
        .ok_or_else(|| Error::Config("No platform config directory".to_string()))?;
    if path.exists() {
        return Err(Error::InvalidInput(format!(
            "{} already exists, not overwriting",
            path.display()
        )));
    }

    let pipeline = toml::Table::try_from(PipelineParams::default())
        .map_err(|e| Error::Config(format!("Serialize pipeline defaults failed: {}", e)))?;
    let config = TomlConfig {
        pipeline: Some(pipeline),
        ..TomlConfig::default()
    };
    write_toml_config(&config, &path)?;
    info!("Wrote default config to {}", path.display());
    Ok(path)
}
