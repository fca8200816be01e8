//! In-memory [`CatalogSource`] over the bundled extension dataset.
//!
//! Categories and topics are derived from the extensions themselves, since
//! the JSON dataset carries no separate tables. Every answer is computed
//! from the immutable extension list; no call can fail.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::aggregate::{
    count_by_category, count_by_topic, derive_categories, derive_topics, sort_featured,
};
use crate::models::{Category, Extension, Topic};

use super::CatalogSource;

/// Static snapshot of the catalog, shared process-wide.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotSource {
    extensions: Arc<Vec<Extension>>,
}

impl StaticSnapshotSource {
    pub fn new(extensions: Vec<Extension>) -> Self {
        Self {
            extensions: Arc::new(extensions),
        }
    }

    /// Every extension in the snapshot, including inactive ones.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    fn active(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.iter().filter(|ext| ext.is_active)
    }
}

#[async_trait]
impl CatalogSource for StaticSnapshotSource {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(derive_categories(self.active()))
    }

    async fn topics(&self) -> Result<Vec<Topic>> {
        Ok(derive_topics(self.active()))
    }

    async fn active_extensions(&self) -> Result<Vec<Extension>> {
        Ok(self.active().cloned().collect())
    }

    async fn featured_extensions(&self, limit: usize) -> Result<Vec<Extension>> {
        let mut featured: Vec<Extension> = self.active().cloned().collect();
        sort_featured(&mut featured);
        featured.truncate(limit);
        Ok(featured)
    }

    async fn extension_by_developer_and_slug(
        &self,
        developer: &str,
        slug: &str,
    ) -> Result<Option<Extension>> {
        Ok(self
            .active()
            .find(|ext| ext.slug == slug && ext.developer_segment() == developer)
            .cloned())
    }

    async fn extensions_by_category(&self, slug: &str) -> Result<Vec<Extension>> {
        Ok(self
            .active()
            .filter(|ext| ext.category.as_deref() == Some(slug))
            .cloned()
            .collect())
    }

    async fn extensions_by_topic(&self, slug: &str) -> Result<Vec<Extension>> {
        Ok(self
            .active()
            .filter(|ext| ext.topics.iter().any(|t| t == slug))
            .cloned()
            .collect())
    }

    async fn category_counts(&self) -> Result<HashMap<String, usize>> {
        Ok(count_by_category(self.active()))
    }

    async fn topic_counts(&self) -> Result<HashMap<String, usize>> {
        Ok(count_by_topic(self.active()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(slug: &str, popular: bool, rating: Option<f64>, active: bool) -> Extension {
        let mut ext = Extension::new(format!("id-{}", slug), slug, slug.to_uppercase());
        ext.is_popular = popular;
        ext.rating = rating;
        ext.is_active = active;
        ext
    }

    fn sample() -> StaticSnapshotSource {
        let mut foo = listing("foo", false, Some(4.2), true);
        foo.topics = vec!["vpn".to_string()];
        foo.category = Some("privacy".to_string());
        foo.developer_username = Some("acme".to_string());

        let mut bar = listing("bar", true, None, true);
        bar.topics = vec!["vpn".to_string(), "proxy".to_string()];
        bar.category = Some("privacy".to_string());

        let mut hidden = listing("hidden", true, Some(5.0), false);
        hidden.topics = vec!["vpn".to_string(), "secret".to_string()];
        hidden.category = Some("stealth".to_string());

        StaticSnapshotSource::new(vec![foo, bar, hidden])
    }

    #[tokio::test]
    async fn test_inactive_never_listed() {
        let src = sample();
        let active = src.active_extensions().await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|e| e.is_active));

        let by_topic = src.extensions_by_topic("secret").await.unwrap();
        assert!(by_topic.is_empty());
        let categories = src.categories().await.unwrap();
        assert!(categories.iter().all(|c| c.slug != "stealth"));
        assert!(src
            .extension_by_developer_and_slug("id-hidden", "hidden")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_featured_limit_and_order() {
        let src = sample();
        let featured = src.featured_extensions(5).await.unwrap();
        let slugs: Vec<&str> = featured.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["bar", "foo"]);

        let one = src.featured_extensions(1).await.unwrap();
        assert_eq!(one.len(), 1);
        assert!(one[0].is_popular);
        assert!(src.featured_extensions(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_developer_must_match() {
        let src = sample();
        let found = src
            .extension_by_developer_and_slug("acme", "foo")
            .await
            .unwrap();
        assert_eq!(found.map(|e| e.slug), Some("foo".to_string()));

        let spoofed = src
            .extension_by_developer_and_slug("someone-else", "foo")
            .await
            .unwrap();
        assert!(spoofed.is_none());

        // No developer row: the id stands in for the developer segment.
        let by_id = src
            .extension_by_developer_and_slug("id-bar", "bar")
            .await
            .unwrap();
        assert!(by_id.is_some());
    }

    #[tokio::test]
    async fn test_filters_and_counts() {
        let src = sample();
        let vpn = src.extensions_by_topic("vpn").await.unwrap();
        assert_eq!(vpn.len(), 2);
        assert!(src.extensions_by_topic("nothing").await.unwrap().is_empty());

        let privacy = src.extensions_by_category("privacy").await.unwrap();
        assert_eq!(privacy.len(), 2);

        let topic_counts = src.topic_counts().await.unwrap();
        assert_eq!(topic_counts.get("vpn"), Some(&2));
        assert_eq!(topic_counts.get("proxy"), Some(&1));
        assert_eq!(topic_counts.get("secret"), None);

        let category_counts = src.category_counts().await.unwrap();
        assert_eq!(category_counts.get("privacy"), Some(&2));
        assert_eq!(category_counts.get("stealth"), None);

        let topics = src.topics().await.unwrap();
        let names: Vec<&str> = topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Proxy", "Vpn"]);
    }
}
