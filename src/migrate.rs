//! Local schema bootstrap.
//!
//! Creates the catalog tables in a SQLite file so a developer machine (or a
//! test) has something to point `[db].path` at. Populating the tables is
//! done out-of-band; the catalog itself only reads them.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS developers (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        email TEXT,
        website TEXT,
        github_url TEXT,
        twitter_url TEXT,
        description TEXT,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL UNIQUE,
        page_title TEXT,
        description TEXT,
        seo_description TEXT,
        icon TEXT,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS topics (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL UNIQUE,
        page_title TEXT,
        description TEXT,
        seo_description TEXT,
        ahrefs_sv INTEGER,
        ahrefs_kd INTEGER,
        ahrefs_tp INTEGER,
        ahrefs_gsv INTEGER,
        ahrefs_gtp INTEGER,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS extensions (
        id TEXT PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        page_title TEXT,
        short_description TEXT,
        description TEXT NOT NULL,
        seo_description TEXT,
        overview TEXT,
        category TEXT REFERENCES categories(id),
        developer_id TEXT REFERENCES developers(id),
        tags TEXT NOT NULL DEFAULT '[]',
        topics TEXT NOT NULL DEFAULT '[]',
        icon TEXT,
        screenshots TEXT NOT NULL DEFAULT '[]',
        features TEXT NOT NULL DEFAULT '[]',
        languages TEXT NOT NULL DEFAULT '[]',
        chrome_store_url TEXT,
        firefox_addon_url TEXT,
        website TEXT,
        edge_store_url TEXT,
        opera_store_url TEXT,
        url TEXT,
        privacy_policy TEXT,
        support_site TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        is_popular INTEGER NOT NULL DEFAULT 0,
        rating REAL,
        rating_count INTEGER,
        users TEXT,
        version TEXT,
        updated TEXT,
        size TEXT,
        developer TEXT,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS topics_to_extensions (
        topic_id TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
        extension_id TEXT NOT NULL REFERENCES extensions(id) ON DELETE CASCADE,
        rank INTEGER NOT NULL DEFAULT 0,
        stripe_product_id TEXT,
        stripe_price_id TEXT,
        is_sponsored INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        PRIMARY KEY (topic_id, extension_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories_to_extensions (
        category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        extension_id TEXT NOT NULL REFERENCES extensions(id) ON DELETE CASCADE,
        rank INTEGER NOT NULL DEFAULT 0,
        stripe_product_id TEXT,
        stripe_price_id TEXT,
        is_sponsored INTEGER NOT NULL DEFAULT 0,
        sponsored_until INTEGER,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        PRIMARY KEY (category_id, extension_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_extensions_developer_id ON extensions(developer_id)",
    "CREATE INDEX IF NOT EXISTS idx_extensions_active ON extensions(is_active, is_popular DESC, rating DESC)",
    "CREATE INDEX IF NOT EXISTS idx_topics_to_extensions_rank ON topics_to_extensions(topic_id, rank)",
    "CREATE INDEX IF NOT EXISTS idx_categories_to_extensions_rank ON categories_to_extensions(category_id, rank)",
];

/// Create the database file (if needed) and all catalog tables.
///
/// Idempotent: running it against an initialized database is a no-op.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let db_config = config
        .db
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("[db] is not configured; nothing to initialize"))?;

    let pool = db::open_pool(db_config, true).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Apply the catalog schema to an open pool.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| "Failed to apply catalog schema")?;
    }
    Ok(())
}
