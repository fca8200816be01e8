//! SQLite-backed [`CatalogSource`] implementation.
//!
//! Translates each catalog read into queries against the catalog tables
//! (developers, categories, topics, extensions and the two rank-ordered
//! association tables). Rows are normalized into the canonical record
//! shapes before they are returned; query errors are returned as-is and
//! handled by the fallback decorator.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use catalog_core::models::{Category, Extension, Topic};
use catalog_core::normalize::{finite_rating, parse_developer_json, parse_json_string_array};
use catalog_core::source::CatalogSource;

/// Extension columns plus the joined developer slug and category slug.
///
/// `extensions.category` references `categories.id`; the slug is what the
/// rest of the catalog works with, so it is resolved here.
const EXTENSION_SELECT: &str = r#"
    SELECT e.id, e.slug, e.name, e.description, e.overview, e.tags, e.topics, e.icon,
           e.screenshots, e.features, e.languages, e.chrome_store_url, e.firefox_addon_url,
           e.website, e.url, e.privacy_policy, e.support_site, e.is_active, e.is_popular,
           e.rating, e.rating_count, e.users, e.version, e.updated, e.size, e.developer,
           e.updated_at,
           COALESCE(c.slug, e.category) AS category_slug,
           d.slug AS developer_slug
    FROM extensions e
    LEFT JOIN developers d ON d.id = e.developer_id
    LEFT JOIN categories c ON c.id = e.category
"#;

/// SQLite implementation of the [`CatalogSource`] trait.
pub struct DatabaseSource {
    pool: SqlitePool,
}

impl DatabaseSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn topic_slugs_for(&self, extension_id: &str) -> Result<Vec<String>> {
        let slugs: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT t.slug
            FROM topics_to_extensions te
            INNER JOIN topics t ON t.id = te.topic_id
            WHERE te.extension_id = ?
            ORDER BY te.rank ASC
            "#,
        )
        .bind(extension_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slugs)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn category_from_row(row: &SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn topic_from_row(row: &SqliteRow) -> Result<Topic> {
    Ok(Topic {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        ahrefs_sv: row.try_get("ahrefs_sv")?,
        ahrefs_kd: row.try_get("ahrefs_kd")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Identity and visibility columns must decode; optional columns that do
/// not are treated as missing and normalized like absent data.
fn extension_from_row(row: &SqliteRow) -> Result<Extension> {
    let text = |column: &str| -> Option<String> { row.try_get(column).ok().flatten() };
    let array = |column: &str| parse_json_string_array(text(column).as_deref());
    let flag = |column: &str| -> Option<bool> { row.try_get(column).ok().flatten() };

    let mut ext = Extension::new(
        row.try_get::<String, _>("id")?,
        row.try_get::<String, _>("slug")?,
        row.try_get::<String, _>("name")?,
    );
    ext.description = text("description").unwrap_or_default();
    ext.overview = text("overview");
    ext.category = text("category_slug");
    ext.tags = array("tags");
    ext.topics = array("topics");
    ext.icon = text("icon");
    ext.screenshots = array("screenshots");
    ext.features = array("features");
    ext.languages = array("languages");
    ext.chrome_store_url = text("chrome_store_url");
    ext.firefox_addon_url = text("firefox_addon_url");
    ext.website = text("website");
    ext.url = text("url");
    ext.privacy_policy = text("privacy_policy");
    ext.support_site = text("support_site");
    ext.is_active = row.try_get::<Option<bool>, _>("is_active")?.unwrap_or(true);
    ext.is_popular = flag("is_popular").unwrap_or(false);
    ext.rating = finite_rating(row.try_get::<Option<f64>, _>("rating").ok().flatten());
    ext.rating_count = row.try_get::<Option<i64>, _>("rating_count").ok().flatten();
    ext.users = text("users");
    ext.version = text("version");
    ext.updated = text("updated").or_else(|| {
        row.try_get::<Option<i64>, _>("updated_at")
            .ok()
            .flatten()
            .map(format_ts_iso)
    });
    ext.size = text("size");
    ext.developer = parse_developer_json(text("developer").as_deref());
    ext.developer_username = text("developer_slug");
    Ok(ext)
}

fn extensions_from_rows(rows: &[SqliteRow]) -> Result<Vec<Extension>> {
    rows.iter().map(extension_from_row).collect()
}

#[async_trait]
impl CatalogSource for DatabaseSource {
    fn name(&self) -> &str {
        "database"
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, slug, name, description, icon,
                   COALESCE(updated_at, created_at) AS updated_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(category_from_row).collect()
    }

    async fn topics(&self) -> Result<Vec<Topic>> {
        let rows = sqlx::query(
            r#"
            SELECT id, slug, name, description, ahrefs_sv, ahrefs_kd,
                   COALESCE(updated_at, created_at) AS updated_at
            FROM topics
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(topic_from_row).collect()
    }

    async fn active_extensions(&self) -> Result<Vec<Extension>> {
        let sql = format!("{} WHERE e.is_active = 1 ORDER BY e.name", EXTENSION_SELECT);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        extensions_from_rows(&rows)
    }

    /// Ordered by popularity, rating, then newest first.
    ///
    /// Unlike the snapshot ordering, rating ties are broken by `created_at`
    /// rather than name, and unrated rows sort after rated ones.
    async fn featured_extensions(&self, limit: usize) -> Result<Vec<Extension>> {
        let sql = format!(
            "{} WHERE e.is_active = 1 ORDER BY e.is_popular DESC, e.rating DESC, e.created_at DESC LIMIT ?",
            EXTENSION_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        extensions_from_rows(&rows)
    }

    async fn extension_by_developer_and_slug(
        &self,
        developer: &str,
        slug: &str,
    ) -> Result<Option<Extension>> {
        let sql = format!(
            "{} WHERE e.slug = ? AND e.is_active = 1 LIMIT 1",
            EXTENSION_SELECT
        );
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut ext = extension_from_row(&row)?;
        if ext.developer_segment() != developer {
            return Ok(None);
        }

        ext.topics = self.topic_slugs_for(&ext.id).await?;
        Ok(Some(ext))
    }

    async fn extensions_by_category(&self, slug: &str) -> Result<Vec<Extension>> {
        let sql = format!(
            r#"{}
            INNER JOIN categories_to_extensions ce ON ce.extension_id = e.id
            INNER JOIN categories cat ON cat.id = ce.category_id
            WHERE cat.slug = ? AND e.is_active = 1
            ORDER BY ce.rank ASC"#,
            EXTENSION_SELECT
        );
        let rows = sqlx::query(&sql).bind(slug).fetch_all(&self.pool).await?;
        extensions_from_rows(&rows)
    }

    async fn extensions_by_topic(&self, slug: &str) -> Result<Vec<Extension>> {
        let sql = format!(
            r#"{}
            INNER JOIN topics_to_extensions te ON te.extension_id = e.id
            INNER JOIN topics t ON t.id = te.topic_id
            WHERE t.slug = ? AND e.is_active = 1
            ORDER BY te.rank ASC"#,
            EXTENSION_SELECT
        );
        let rows = sqlx::query(&sql).bind(slug).fetch_all(&self.pool).await?;
        extensions_from_rows(&rows)
    }

    /// Groups active extensions by their category column.
    async fn category_counts(&self) -> Result<HashMap<String, usize>> {
        let rows = sqlx::query(
            r#"
            SELECT COALESCE(c.slug, e.category) AS slug, COUNT(*) AS n
            FROM extensions e
            LEFT JOIN categories c ON c.id = e.category
            WHERE e.is_active = 1 AND e.category IS NOT NULL
            GROUP BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        counts_from_rows(&rows)
    }

    /// Aggregates over the topic association table.
    async fn topic_counts(&self) -> Result<HashMap<String, usize>> {
        let rows = sqlx::query(
            r#"
            SELECT t.slug AS slug, COUNT(*) AS n
            FROM topics_to_extensions te
            INNER JOIN topics t ON t.id = te.topic_id
            INNER JOIN extensions e ON e.id = te.extension_id
            WHERE e.is_active = 1
            GROUP BY t.slug
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        counts_from_rows(&rows)
    }
}

fn counts_from_rows(rows: &[SqliteRow]) -> Result<HashMap<String, usize>> {
    rows.iter()
        .map(|row| -> Result<(String, usize)> {
            let slug: String = row.try_get("slug")?;
            let n: i64 = row.try_get("n")?;
            Ok((slug, usize::try_from(n).unwrap_or(0)))
        })
        .collect()
}
