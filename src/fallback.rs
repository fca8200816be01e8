//! Database-or-snapshot decorator.
//!
//! [`FallbackSource`] wraps an optional primary source (the database) and
//! the static snapshot. Every call goes to the primary first; if there is no
//! primary, or the call fails, the snapshot answers instead. Errors are
//! logged and never returned, so the catalog always renders something.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use catalog_core::models::{Category, Extension, Topic};
use catalog_core::source::{CatalogSource, StaticSnapshotSource};

/// Try the primary source, then the snapshot.
///
/// `$src` is bound to each source in turn and `$call` evaluated against it.
macro_rules! with_fallback {
    ($self:ident, $op:literal, |$src:ident| $call:expr) => {{
        if let Some($src) = $self.primary.as_deref() {
            match $call.await {
                Ok(value) => return Ok(value),
                Err(e) => warn!(
                    operation = $op,
                    source = $src.name(),
                    error = %e,
                    "catalog query failed; serving static snapshot"
                ),
            }
        }
        let $src = &$self.snapshot;
        $call.await
    }};
}

pub struct FallbackSource {
    primary: Option<Arc<dyn CatalogSource>>,
    snapshot: StaticSnapshotSource,
}

impl FallbackSource {
    pub fn new(primary: Option<Arc<dyn CatalogSource>>, snapshot: StaticSnapshotSource) -> Self {
        Self { primary, snapshot }
    }

    pub fn snapshot_only(snapshot: StaticSnapshotSource) -> Self {
        Self::new(None, snapshot)
    }

    /// Whether a primary source was available at construction.
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn snapshot(&self) -> &StaticSnapshotSource {
        &self.snapshot
    }
}

#[async_trait]
impl CatalogSource for FallbackSource {
    fn name(&self) -> &str {
        match &self.primary {
            Some(primary) => primary.name(),
            None => self.snapshot.name(),
        }
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        with_fallback!(self, "categories", |src| src.categories())
    }

    async fn topics(&self) -> Result<Vec<Topic>> {
        with_fallback!(self, "topics", |src| src.topics())
    }

    async fn active_extensions(&self) -> Result<Vec<Extension>> {
        with_fallback!(self, "active_extensions", |src| src.active_extensions())
    }

    async fn featured_extensions(&self, limit: usize) -> Result<Vec<Extension>> {
        with_fallback!(self, "featured_extensions", |src| {
            src.featured_extensions(limit)
        })
    }

    async fn extension_by_developer_and_slug(
        &self,
        developer: &str,
        slug: &str,
    ) -> Result<Option<Extension>> {
        with_fallback!(self, "extension_by_developer_and_slug", |src| {
            src.extension_by_developer_and_slug(developer, slug)
        })
    }

    async fn extensions_by_category(&self, slug: &str) -> Result<Vec<Extension>> {
        with_fallback!(self, "extensions_by_category", |src| {
            src.extensions_by_category(slug)
        })
    }

    async fn extensions_by_topic(&self, slug: &str) -> Result<Vec<Extension>> {
        with_fallback!(self, "extensions_by_topic", |src| src.extensions_by_topic(slug))
    }

    async fn category_counts(&self) -> Result<HashMap<String, usize>> {
        with_fallback!(self, "category_counts", |src| src.category_counts())
    }

    async fn topic_counts(&self) -> Result<HashMap<String, usize>> {
        with_fallback!(self, "topic_counts", |src| src.topic_counts())
    }
}
