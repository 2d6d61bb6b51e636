//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.redview/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::types::{Endpoint, ParseEndpointError};
use crate::store::{PoolConfig, Timeouts};

/// Env var for the server address.
pub const ENV_ADDR: &str = "REDVIEW_ADDR";
/// Env var for the initial scan pattern.
pub const ENV_PATTERN: &str = "REDVIEW_PATTERN";

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RedviewConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    /// `host:port`
    pub address: Option<String>,
    pub max_idle: Option<usize>,
    pub max_active: Option<usize>,
    pub idle_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub command_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BrowserConfig {
    pub default_pattern: Option<String>,
    pub scan_count: Option<usize>,
}

// ============================================================================
// Defaults
// ============================================================================

// Endpoint, pool and timeout defaults live with their types in `store`.

pub const DEFAULT_PATTERN: &str = "*";
pub const DEFAULT_SCAN_COUNT: usize = 100;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub endpoint: Endpoint,
    pub pattern: String,
    pub pool: PoolConfig,
    pub timeouts: Timeouts,
    /// `None` when configured as 0 (server default).
    pub scan_count: Option<usize>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            pattern: DEFAULT_PATTERN.to_string(),
            pool: PoolConfig::default(),
            timeouts: Timeouts::default(),
            scan_count: Some(DEFAULT_SCAN_COUNT),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Endpoint(ParseEndpointError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Endpoint(e) => write!(f, "config error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.redview/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".redview").join("config.toml"))
}

/// Load config from `~/.redview/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RedviewConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<RedviewConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(RedviewConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(RedviewConfig::default());
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<RedviewConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RedviewConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Redview Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# address = "localhost:6379"         # Or set REDVIEW_ADDR env var
# max_idle = 3                       # Idle connections kept for reuse
# max_active = 0                     # Connections in use at once (0 = unlimited)
# idle_timeout_secs = 240            # Idle connections older than this are closed
# connect_timeout_secs = 5
# command_timeout_secs = 10

# [browser]
# default_pattern = "*"              # Or set REDVIEW_PATTERN env var
# scan_count = 100                   # COUNT hint per SCAN round (0 = server default)
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
///
/// `cli_address` and `cli_pattern` are from CLI flags (None = not specified).
pub fn resolve(
    config: &RedviewConfig,
    cli_address: Option<&str>,
    cli_pattern: Option<&str>,
) -> Result<ResolvedConfig, ConfigError> {
    resolve_with(config, cli_address, cli_pattern, |name| std::env::var(name).ok())
}

/// [`resolve`] with env vars read through `env`.
pub fn resolve_with<F>(
    config: &RedviewConfig,
    cli_address: Option<&str>,
    cli_pattern: Option<&str>,
    env: F,
) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = ResolvedConfig::default();

    // Address: CLI → env → config → default
    let address = cli_address
        .map(|s| s.to_string())
        .or_else(|| env(ENV_ADDR))
        .or_else(|| config.server.address.clone());
    let endpoint = match address {
        Some(address) => address.parse().map_err(ConfigError::Endpoint)?,
        None => defaults.endpoint,
    };

    // Pattern: CLI → env → config → default
    let pattern = cli_pattern
        .map(|s| s.to_string())
        .or_else(|| env(ENV_PATTERN))
        .or_else(|| config.browser.default_pattern.clone())
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(defaults.pattern);

    let server = &config.server;
    let pool = PoolConfig {
        max_idle: server.max_idle.unwrap_or(defaults.pool.max_idle),
        max_active: server.max_active.unwrap_or(defaults.pool.max_active),
        idle_timeout: server
            .idle_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.pool.idle_timeout),
    };
    let timeouts = Timeouts {
        connect: server
            .connect_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeouts.connect),
        command: server
            .command_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeouts.command),
    };

    let scan_count = match config.browser.scan_count {
        Some(0) => None,
        Some(n) => Some(n),
        None => defaults.scan_count,
    };

    Ok(ResolvedConfig {
        endpoint,
        pattern,
        pool,
        timeouts,
        scan_count,
    })
}
