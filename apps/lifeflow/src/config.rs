//! # Configuration
//!
//! `AppConfig` is assembled in three layers, later layers winning:
//!
//! 1. TOML file (`--config`, or `lifeflow.toml` in the working directory
//!    if it exists)
//! 2. Environment variables
//! 3. CLI flags
//!
//! ## Environment Variables
//!
//! - `LIFEFLOW_HOST`, `LIFEFLOW_PORT`: server bind address
//! - `LIFEFLOW_DATABASE`: path to the registry database
//! - `LIFEFLOW_BACKEND`: `redb` or `file`
//! - `LIFEFLOW_RATE_LIMIT`: requests per second (0 disables)
//! - `LIFEFLOW_CORS_ORIGINS`: comma-separated origins, or `*` for all

use lifeflow_core::LifeFlowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "lifeflow.toml";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// BACKEND
// =============================================================================

/// Registry storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// ACID redb database.
    #[default]
    Redb,
    /// In-memory registry snapshotted to a single file.
    File,
}

impl Backend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::File => "file",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = LifeFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redb" => Ok(Self::Redb),
            "file" => Ok(Self::File),
            other => Err(LifeFlowError::invalid_field(
                "backend",
                format!("unknown backend '{}', use redb or file", other),
            )),
        }
    }
}

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Allowed CORS origins. Empty means localhost only; `"*"` allows all.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: 100,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Registry storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database: PathBuf,
    pub backend: Backend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("lifeflow.db"),
            backend: Backend::Redb,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

// =============================================================================
// LOADING
// =============================================================================

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, LifeFlowError> {
        toml::from_str(text)
            .map_err(|e| LifeFlowError::SerializationError(format!("Invalid config: {}", e)))
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, LifeFlowError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            LifeFlowError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(LifeFlowError::SerializationError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            LifeFlowError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Load the file layer and the environment layer.
    ///
    /// An explicit `path` must exist. Without one, `lifeflow.toml` is used
    /// if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, LifeFlowError> {
        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading config from {:?}", path);
                Self::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::info!("Loading config from {}", DEFAULT_CONFIG_FILE);
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `LIFEFLOW_*` overrides from an environment lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("LIFEFLOW_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "LIFEFLOW_PORT") {
            self.server.port = port;
        }
        if let Some(rate_limit) = parse_var(&lookup, "LIFEFLOW_RATE_LIMIT") {
            self.server.rate_limit = rate_limit;
        }
        if let Some(origins) = lookup("LIFEFLOW_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(database) = lookup("LIFEFLOW_DATABASE") {
            self.storage.database = PathBuf::from(database);
        }
        if let Some(backend) = parse_var(&lookup, "LIFEFLOW_BACKEND") {
            self.storage.backend = backend;
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring invalid {} value '{}': {}", key, raw, e);
            None
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
