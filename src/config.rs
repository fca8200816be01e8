//! TOML configuration.
//!
//! Every section is optional except where noted; an empty file yields a
//! snapshot-only catalog served on the default bind address.
//!
//! ```toml
//! [db]
//! path = "./data/catalog.sqlite"
//!
//! [snapshot]
//! path = "./data/extensions.json"
//! products_dir = "./data/products"
//!
//! [site]
//! base_url = "https://extensions.serp.co"
//!
//! [server]
//! bind = "127.0.0.1:7340"
//!
//! [log]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Absent means no database is configured and every read is served
    /// from the snapshot.
    #[serde(default)]
    pub db: Option<DbConfig>,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SnapshotConfig {
    /// JSON array of extensions. Absent means the compiled-in dataset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Directory of per-product JSON files merged into the snapshot.
    #[serde(default)]
    pub products_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://extensions.serp.co".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Number of listings returned by `GET /api/extensions`.
    #[serde(default = "default_featured_limit")]
    pub featured_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            featured_limit: default_featured_limit(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

fn default_featured_limit() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Snapshot-only configuration using the compiled-in dataset.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if let Some(db) = &config.db {
        if db.max_connections == 0 {
            anyhow::bail!("db.max_connections must be >= 1");
        }
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.server.featured_limit == 0 {
        anyhow::bail!("server.featured_limit must be >= 1");
    }

    let base = &config.site.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!(
            "site.base_url must start with http:// or https:// (got '{}')",
            base
        );
    }

    Ok(())
}
