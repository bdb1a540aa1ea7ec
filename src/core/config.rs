//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.fable/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ImageBackend;
use crate::images::providers::fixed::DEFAULT_FIXED_IMAGE_URL;
use crate::images::providers::openai::{
    DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_QUALITY, DEFAULT_IMAGE_SIZE, DEFAULT_OPENAI_BASE_URL,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FableConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
    pub demo_story: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ImagesConfig {
    pub provider: Option<ImageBackend>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
    pub quality: Option<String>,
    pub fixed_url: Option<String>,
    pub archive_dir: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub bind: String,
    pub allowed_origins: Vec<String>,
    pub demo_story: bool,
    pub image_backend: ImageBackend,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub fixed_image_url: String,
    pub archive_dir: Option<PathBuf>,
}

/// Values given on the command line. `None`/`false` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub image_backend: Option<ImageBackend>,
    pub demo_story: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.fable/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".fable").join("config.toml"))
}

/// Load config from `~/.fable/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FableConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<FableConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(FableConfig::default());
        }
    };
    load_config_from(&path)
}

/// Like `load_config`, but from an explicit path.
pub fn load_config_from(path: &Path) -> Result<FableConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(FableConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FableConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", redacted(&config));
    Ok(config)
}

/// Debug view of the config with the API key masked.
fn redacted(config: &FableConfig) -> String {
    let key = config.images.api_key.as_ref().map(|_| "<set>");
    format!(
        "server={:?}, images.provider={:?}, images.api_key={:?}, images.base_url={:?}",
        config.server, config.images.provider, key, config.images.base_url
    )
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Fable Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# bind = "127.0.0.1:5000"                     # Or set FABLE_BIND
# allowed_origins = ["http://localhost:5173"] # Dashboard origins; CORS is off when unset
# demo_story = false                          # Seed new sessions with the sailing story

# [images]
# provider = "openai"                         # "openai" or "fixed"
# api_key = "sk-..."                          # Or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"      # Or set OPENAI_BASE_URL
# model = "dall-e-3"
# size = "1024x1024"
# quality = "standard"
# fixed_url = "https://example.com/placeholder.jpg"  # Used by the "fixed" provider
# archive_dir = "images"                      # Keep a copy of every generated image
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &FableConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Bind address: CLI → env → config → default
    let bind = cli
        .bind
        .clone()
        .or_else(|| std::env::var("FABLE_BIND").ok())
        .or_else(|| config.server.bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    // Image backend: CLI → env → config → default
    let image_backend = cli
        .image_backend
        .or_else(|| {
            std::env::var("FABLE_IMAGE_PROVIDER")
                .ok()
                .and_then(|s| ImageBackend::from_str(&s, true).ok())
        })
        .or(config.images.provider)
        .unwrap_or_default();

    // OpenAI API key: env → config
    let openai_api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .or_else(|| config.images.api_key.clone());

    // OpenAI base URL: env → config → default
    let openai_base_url = std::env::var("OPENAI_BASE_URL")
        .ok()
        .or_else(|| config.images.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

    ResolvedConfig {
        bind,
        // No configured origins means no CORS layer at all
        allowed_origins: config.server.allowed_origins.clone().unwrap_or_default(),
        demo_story: cli.demo_story || config.server.demo_story.unwrap_or(false),
        image_backend,
        openai_api_key,
        openai_base_url,
        image_model: config
            .images
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        image_size: config
            .images
            .size
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
        image_quality: config
            .images
            .quality
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_QUALITY.to_string()),
        fixed_image_url: config
            .images
            .fixed_url
            .clone()
            .unwrap_or_else(|| DEFAULT_FIXED_IMAGE_URL.to_string()),
        archive_dir: config.images.archive_dir.as_ref().map(PathBuf::from),
    }
}
