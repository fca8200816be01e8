//! Request-scoped catalog facade.
//!
//! A [`Catalog`] is created per request (or per CLI invocation) on top of a
//! shared [`CatalogSource`]. The category, topic, and extension loaders are
//! memoized for the lifetime of the `Catalog`, so repeated calls during one
//! render hit the source once. Every method returns a value: a source error
//! is logged and turned into an empty result.
//!
//! ```text
//! Catalog (per request, memoized loaders)
//!    └── FallbackSource
//!          ├── DatabaseSource (optional)
//!          └── StaticSnapshotSource
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use catalog_core::aggregate::with_counts;
use catalog_core::models::{Category, Extension, Topic, WithCount};
use catalog_core::normalize::placeholder_topic;
use catalog_core::source::CatalogSource;

use crate::config::Config;
use crate::dataset::load_snapshot;
use crate::db;
use crate::fallback::FallbackSource;
use crate::sqlite_source::DatabaseSource;

/// Build the process-wide source: the static snapshot, fronted by the
/// database when one is configured and reachable.
pub async fn open_source(config: &Config) -> Result<Arc<FallbackSource>> {
    let snapshot = load_snapshot(&config.snapshot)?;
    let primary = db::connect(config)
        .await
        .map(|pool| Arc::new(DatabaseSource::new(pool)) as Arc<dyn CatalogSource>);

    let source = FallbackSource::new(primary, snapshot);
    info!(source = source.name(), "catalog source ready");
    Ok(Arc::new(source))
}

fn recover<T: Default>(operation: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!(operation, error = %e, "catalog read failed; returning empty result");
        T::default()
    })
}

pub struct Catalog {
    source: Arc<dyn CatalogSource>,
    categories: OnceCell<Vec<Category>>,
    topics: OnceCell<Vec<Topic>>,
    extensions: OnceCell<Vec<Extension>>,
}

impl Catalog {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            categories: OnceCell::new(),
            topics: OnceCell::new(),
            extensions: OnceCell::new(),
        }
    }

    /// Name of the source serving reads ("database" or "snapshot").
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    async fn load_categories(&self) -> &[Category] {
        self.categories
            .get_or_init(|| async { recover("categories", self.source.categories().await) })
            .await
    }

    async fn load_topics(&self) -> &[Topic] {
        self.topics
            .get_or_init(|| async { recover("topics", self.source.topics().await) })
            .await
    }

    async fn load_extensions(&self) -> &[Extension] {
        self.extensions
            .get_or_init(|| async {
                recover(
                    "active_extensions",
                    self.source.active_extensions().await,
                )
            })
            .await
    }

    /// All categories, sorted by name.
    pub async fn categories(&self) -> Vec<Category> {
        self.load_categories().await.to_vec()
    }

    /// All topics, sorted by name.
    pub async fn topics(&self) -> Vec<Topic> {
        self.load_topics().await.to_vec()
    }

    pub async fn active_extensions(&self) -> Vec<Extension> {
        self.load_extensions()
            .await
            .iter()
            .filter(|ext| ext.is_active)
            .cloned()
            .collect()
    }

    /// At most `limit` listings; popular listings always come first.
    pub async fn featured_extensions(&self, limit: usize) -> Vec<Extension> {
        let mut featured = recover(
            "featured_extensions",
            self.source.featured_extensions(limit).await,
        );
        featured.truncate(limit);
        featured
    }

    pub async fn extension_by_developer_and_slug(
        &self,
        developer: &str,
        slug: &str,
    ) -> Option<Extension> {
        recover(
            "extension_by_developer_and_slug",
            self.source
                .extension_by_developer_and_slug(developer, slug)
                .await,
        )
    }

    pub async fn extension_by_slug_and_id(&self, slug: &str, id: &str) -> Option<Extension> {
        self.load_extensions()
            .await
            .iter()
            .find(|ext| ext.is_active && ext.slug == slug && ext.id == id)
            .cloned()
    }

    pub async fn category_by_slug(&self, slug: &str) -> Option<Category> {
        self.load_categories()
            .await
            .iter()
            .find(|category| category.slug == slug)
            .cloned()
    }

    /// Topic by slug, or a placeholder when no topic row exists but an
    /// active extension still references the slug.
    pub async fn topic_by_slug(&self, slug: &str) -> Option<Topic> {
        if let Some(topic) = self.load_topics().await.iter().find(|t| t.slug == slug) {
            return Some(topic.clone());
        }

        let referenced = self
            .load_extensions()
            .await
            .iter()
            .any(|ext| ext.is_active && ext.topics.iter().any(|t| t == slug));
        referenced.then(|| placeholder_topic(slug))
    }

    /// Listings in the category, in rank order.
    pub async fn extensions_by_category(&self, slug: &str) -> Vec<Extension> {
        recover(
            "extensions_by_category",
            self.source.extensions_by_category(slug).await,
        )
    }

    /// Listings tagged with the topic, in rank order.
    pub async fn extensions_by_topic(&self, slug: &str) -> Vec<Extension> {
        recover(
            "extensions_by_topic",
            self.source.extensions_by_topic(slug).await,
        )
    }

    pub async fn categories_with_counts(&self) -> Vec<WithCount<Category>> {
        let (categories, counts) =
            tokio::join!(self.load_categories(), self.source.category_counts());
        let counts: HashMap<String, usize> = recover("category_counts", counts);
        with_counts(categories.to_vec(), &counts, |c| c.slug.as_str())
    }

    pub async fn topics_with_counts(&self) -> Vec<WithCount<Topic>> {
        let (topics, counts) = tokio::join!(self.load_topics(), self.source.topic_counts());
        let counts: HashMap<String, usize> = recover("topic_counts", counts);
        with_counts(topics.to_vec(), &counts, |t| t.slug.as_str())
    }

    /// Topics by search volume, highest first; topics without a volume last.
    pub async fn top_topics(&self, limit: usize) -> Vec<Topic> {
        let mut topics = self.topics().await;
        topics.sort_by(|a, b| b.ahrefs_sv.cmp(&a.ahrefs_sv));
        topics.truncate(limit);
        topics
    }

    /// The extension's topics that can be shown as links: stale slugs and
    /// topics without any active listing are dropped. Order follows the
    /// extension's own topic ranking.
    pub async fn renderable_topics(&self, extension: &Extension) -> Vec<Topic> {
        let topics = self.topics_with_counts().await;
        extension
            .topics
            .iter()
            .filter_map(|slug| {
                topics
                    .iter()
                    .find(|t| &t.item.slug == slug && t.count > 0)
                    .map(|t| t.item.clone())
            })
            .collect()
    }
}
