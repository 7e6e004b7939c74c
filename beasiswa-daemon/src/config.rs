//! Daemon configuration loading from `beasiswa.toml`.
//!
//! Configuration is optional: a missing file yields defaults, and a file that
//! fails to parse is reported as a warning and ignored.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [build]
//! records = "data/records.json"
//! snapshot = "data/graph.snapshot.json"
//! eligibility = "upstream"   # or "gate-on-flag"
//! on_malformed = "skip"      # or "abort"
//!
//! [query]
//! default_top_countries = 5
//! ```

use beasiswa_core::{BuildOptions, EligibilityPolicy, MalformedPolicy, DEFAULT_TOP_COUNTRIES};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "beasiswa.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where records come from and how they are turned into a graph.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BuildConfig {
    /// Record batch to build from (`.json`, `.jsonl`, `.ndjson` or `.csv`).
    #[serde(default)]
    pub records: Option<PathBuf>,

    /// Snapshot written after each build and loaded when no records are configured.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,

    #[serde(default)]
    pub eligibility: EligibilityPolicy,

    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

impl BuildConfig {
    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            eligibility: self.eligibility,
            on_malformed: self.on_malformed,
        }
    }
}

/// Query defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// `n` for `/country/top` when the request gives none.
    #[serde(default = "default_top_countries")]
    pub default_top_countries: i64,
}

fn default_top_countries() -> i64 {
    DEFAULT_TOP_COUNTRIES
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_top_countries: DEFAULT_TOP_COUNTRIES,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from `path`.
    ///
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Socket address string for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
