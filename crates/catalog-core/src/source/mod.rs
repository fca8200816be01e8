//! Catalog source abstraction.
//!
//! The [`CatalogSource`] trait defines every read the catalog layer needs,
//! so the database-backed source and the static snapshot can be swapped or
//! stacked (the application wraps both in a fallback decorator).
//!
//! Implementations must be `Send + Sync` to be shared across requests.

pub mod snapshot;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Category, Extension, Topic};

pub use snapshot::StaticSnapshotSource;

/// Read-only access to catalog data.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`categories`](CatalogSource::categories) | All categories, sorted by name |
/// | [`topics`](CatalogSource::topics) | All topics, sorted by name |
/// | [`active_extensions`](CatalogSource::active_extensions) | Every listing with `is_active` |
/// | [`featured_extensions`](CatalogSource::featured_extensions) | Top listings for the home page |
/// | [`extension_by_developer_and_slug`](CatalogSource::extension_by_developer_and_slug) | Detail page lookup |
/// | [`extensions_by_category`](CatalogSource::extensions_by_category) | Category listing in rank order |
/// | [`extensions_by_topic`](CatalogSource::extensions_by_topic) | Topic listing in rank order |
/// | [`category_counts`](CatalogSource::category_counts) | Active listings per category slug |
/// | [`topic_counts`](CatalogSource::topic_counts) | Active listings per topic slug |
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short label used in logs and health output.
    fn name(&self) -> &str;

    async fn categories(&self) -> Result<Vec<Category>>;

    async fn topics(&self) -> Result<Vec<Topic>>;

    async fn active_extensions(&self) -> Result<Vec<Extension>>;

    /// At most `limit` active extensions in featured order.
    async fn featured_extensions(&self, limit: usize) -> Result<Vec<Extension>>;

    /// The extension with `slug` published under `developer`.
    ///
    /// Returns `None` when the developer does not match, even if the slug
    /// exists under another developer.
    async fn extension_by_developer_and_slug(
        &self,
        developer: &str,
        slug: &str,
    ) -> Result<Option<Extension>>;

    async fn extensions_by_category(&self, slug: &str) -> Result<Vec<Extension>>;

    async fn extensions_by_topic(&self, slug: &str) -> Result<Vec<Extension>>;

    async fn category_counts(&self) -> Result<HashMap<String, usize>>;

    async fn topic_counts(&self) -> Result<HashMap<String, usize>>;
}
