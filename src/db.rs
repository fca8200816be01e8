use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::{Config, DbConfig};

/// Connection check for the read path.
///
/// Returns `None` when no database is configured or the database cannot be
/// opened; callers then serve everything from the snapshot. A missing
/// database file is treated as unavailable rather than created.
pub async fn connect(config: &Config) -> Option<SqlitePool> {
    let db = config.db.as_ref()?;
    match open_pool(db, false).await {
        Ok(pool) => {
            debug!(path = %db.path.display(), "connected to catalog database");
            Some(pool)
        }
        Err(e) => {
            warn!(path = %db.path.display(), error = %e, "catalog database unavailable");
            None
        }
    }
}

/// Open a pool, optionally creating the database file (used by `init`).
pub async fn open_pool(db: &DbConfig, create: bool) -> Result<SqlitePool> {
    let db_path = &db.path;

    if create {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(create)
        .foreign_keys(true);
    if create {
        options = options.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(db.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    Ok(pool)
}
