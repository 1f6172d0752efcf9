//! Application configuration for the Yana Flow data layer.
//!
//! User config lives at `~/.yanaflow/yanaflow.toml`.
//! Environment variables named by the config override file values, which
//! override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, YanaFlowError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "yanaflow.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".yanaflow";

// ---------------------------------------------------------------------------
// Config structs (matching yanaflow.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hosted backend connection.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Session bootstrap behavior.
    #[serde(default)]
    pub session: SessionConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[backend]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL (e.g. `https://xyz.supabase.co`).
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Env var that, when set, overrides `url`.
    #[serde(default = "default_url_env")]
    pub url_env: String,

    /// Name of the env var holding the anon key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Postgres schema the tables live in.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            url_env: default_url_env(),
            api_key_env: default_api_key_env(),
            schema: default_schema(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:54321".into()
}
fn default_url_env() -> String {
    "SUPABASE_URL".into()
}
fn default_api_key_env() -> String {
    "SUPABASE_KEY".into()
}
fn default_schema() -> String {
    "public".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl BackendConfig {
    /// The effective project URL: `url_env` if set and non-empty, else `url`.
    pub fn base_url(&self) -> Result<Url> {
        let raw = match std::env::var(&self.url_env) {
            Ok(val) if !val.trim().is_empty() => val,
            _ => self.url.clone(),
        };
        Url::parse(raw.trim())
            .map_err(|e| YanaFlowError::config(format!("invalid backend url '{raw}': {e}")))
    }
}

/// `[session]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fixed seed for placeholder copy. Unset means a fresh seed per session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_seed: Option<u64>,

    /// Give courses and events without an image a random cover.
    #[serde(default)]
    pub fill_cover_images: bool,
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "yanaflow=info".into()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.yanaflow/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| YanaFlowError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.yanaflow/yanaflow.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| YanaFlowError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| YanaFlowError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| YanaFlowError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| YanaFlowError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| YanaFlowError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the backend anon key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.backend.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(YanaFlowError::config(format!(
            "backend API key not found. Set the {var_name} environment variable \
             to the project's anon key."
        ))),
    }
}
