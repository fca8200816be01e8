#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use tempfile::TempDir;

use extension_catalog::config::{Config, DbConfig, SnapshotConfig};
use extension_catalog::{db, migrate};

/// Snapshot used whenever the database cannot answer.
pub const SNAPSHOT_JSON: &str = r#"[
    {"slug": "foo", "name": "Foo", "isActive": true, "topics": ["vpn"], "category": "privacy",
     "tags": null, "rating": "4.1"},
    {"slug": "bar", "name": "Bar", "isActive": false, "topics": ["vpn", "ghost"]},
    {"slug": "baz", "name": "Baz", "isPopular": true, "rating": 3.0, "developerUsername": "bazco"}
]"#;

pub fn write_snapshot(dir: &Path) -> PathBuf {
    let path = dir.join("extensions.json");
    fs::write(&path, SNAPSHOT_JSON).unwrap();
    path
}

/// Config pointing at `db_path` (optional) and the test snapshot.
pub fn config_for(tmp: &TempDir, db_path: Option<PathBuf>) -> Config {
    let mut config = Config::minimal();
    config.db = db_path.map(|path| DbConfig {
        path,
        max_connections: 2,
    });
    config.snapshot = SnapshotConfig {
        path: Some(write_snapshot(tmp.path())),
        products_dir: None,
    };
    config
}

/// Create a database file with the catalog schema and the fixture rows.
pub async fn seeded_database(dir: &Path) -> PathBuf {
    let path = dir.join("catalog.sqlite");
    let pool = db::open_pool(
        &DbConfig {
            path: path.clone(),
            max_connections: 1,
        },
        true,
    )
    .await
    .unwrap();
    migrate::apply_schema(&pool).await.unwrap();
    seed(&pool).await;
    pool.close().await;
    path
}

/// Fixture:
///
/// - `fast-vpn` (developer `acme`, popular, 4.2) and `safe-vpn` (no
///   developer, 4.8, malformed tags) in `privacy`
/// - `old-vpn`, inactive, ranked first everywhere
/// - `notes` (developer `acme`, unrated) in `productivity`
/// - topic `vpn` last updated 2024-03-05T00:00:00Z
/// - topic `screen-recorder` exists with no associations
pub async fn seed(pool: &SqlitePool) {
    let statements = [
        "INSERT INTO developers (id, slug, name) VALUES ('dev-1', 'acme', 'Acme Inc')",
        "INSERT INTO categories (id, slug, name) VALUES ('cat-priv', 'privacy', 'Privacy')",
        "INSERT INTO categories (id, slug, name, description) VALUES ('cat-prod', 'productivity', 'Productivity', 'Get things done')",
        "INSERT INTO topics (id, slug, name, ahrefs_sv, updated_at) VALUES ('t-vpn', 'vpn', 'VPN', 250000, 1709596800)",
        "INSERT INTO topics (id, slug, name, ahrefs_sv) VALUES ('t-sr', 'screen-recorder', 'Screen Recorder', 5000)",
        "INSERT INTO topics (id, slug, name) VALUES ('t-ab', 'ad-blocker', 'Ad Blocker')",
        r#"INSERT INTO extensions (id, slug, name, description, category, developer_id, tags, topics, is_popular, rating, developer, created_at)
           VALUES ('e1', 'fast-vpn', 'Fast VPN', 'Fast', 'cat-priv', 'dev-1', '["vpn"]', '["vpn"]', 1, 4.2,
                   '{"name": "Acme Inc", "website": "https://acme.test"}', 100)"#,
        r#"INSERT INTO extensions (id, slug, name, description, category, tags, topics, rating, updated, created_at)
           VALUES ('e2', 'safe-vpn', 'Safe VPN', 'Safe', 'cat-priv', 'not json', '["vpn"]', 4.8, '2024-03-05', 200)"#,
        r#"INSERT INTO extensions (id, slug, name, description, category, is_active, rating, created_at)
           VALUES ('e3', 'old-vpn', 'Old VPN', 'Old', 'cat-priv', 0, 5.0, 300)"#,
        r#"INSERT INTO extensions (id, slug, name, description, category, developer_id, created_at)
           VALUES ('e4', 'notes', 'Notes', 'Notes', 'cat-prod', 'dev-1', 400)"#,
        "INSERT INTO topics_to_extensions (topic_id, extension_id, rank) VALUES ('t-vpn', 'e3', 0)",
        "INSERT INTO topics_to_extensions (topic_id, extension_id, rank) VALUES ('t-vpn', 'e2', 1)",
        "INSERT INTO topics_to_extensions (topic_id, extension_id, rank) VALUES ('t-vpn', 'e1', 2)",
        "INSERT INTO categories_to_extensions (category_id, extension_id, rank) VALUES ('cat-priv', 'e3', 0)",
        "INSERT INTO categories_to_extensions (category_id, extension_id, rank) VALUES ('cat-priv', 'e2', 1)",
        "INSERT INTO categories_to_extensions (category_id, extension_id, rank) VALUES ('cat-priv', 'e1', 2)",
        "INSERT INTO categories_to_extensions (category_id, extension_id, rank) VALUES ('cat-prod', 'e4', 1)",
    ];
    for sql in statements {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

/// A database file that opens fine but has no tables.
pub async fn empty_database(dir: &Path) -> PathBuf {
    let path = dir.join("empty.sqlite");
    let pool = db::open_pool(
        &DbConfig {
            path: path.clone(),
            max_connections: 1,
        },
        true,
    )
    .await
    .unwrap();
    pool.close().await;
    path
}
