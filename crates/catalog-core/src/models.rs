//! Canonical catalog records.
//!
//! Every record leaving the catalog layer has one of these shapes, no matter
//! whether it was read from a database row or from the static JSON snapshot.
//! Field names serialize in camelCase to match the JSON dataset.

use serde::Serialize;

/// A category an extension is filed under.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Last modification as a Unix timestamp, when the row records one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// A topic ("best X extensions") page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Monthly search volume, used for popularity tiering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahrefs_sv: Option<i64>,
    /// Keyword difficulty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ahrefs_kd: Option<i64>,
    /// Last modification as a Unix timestamp, when the row records one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Contact details embedded in an extension record.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A browser extension listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Category slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Topic slugs, in ranking order.
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub screenshots: Vec<String>,
    pub features: Vec<String>,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_store_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firefox_addon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_site: Option<String>,
    pub is_active: bool,
    pub is_popular: bool,
    /// Always finite when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<DeveloperInfo>,
    /// Slug of the owning developer row, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_username: Option<String>,
}

impl Extension {
    /// Minimal active listing with every optional field empty.
    pub fn new(id: impl Into<String>, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            name: name.into(),
            description: String::new(),
            overview: None,
            category: None,
            tags: Vec::new(),
            topics: Vec::new(),
            icon: None,
            screenshots: Vec::new(),
            features: Vec::new(),
            languages: Vec::new(),
            chrome_store_url: None,
            firefox_addon_url: None,
            website: None,
            url: None,
            privacy_policy: None,
            support_site: None,
            is_active: true,
            is_popular: false,
            rating: None,
            rating_count: None,
            users: None,
            version: None,
            updated: None,
            size: None,
            developer: None,
            developer_username: None,
        }
    }

    /// Path segment identifying the developer in public URLs.
    ///
    /// Falls back to the extension id for listings without a developer row.
    pub fn developer_segment(&self) -> &str {
        match self.developer_username.as_deref() {
            Some(username) if !username.is_empty() => username,
            _ => &self.id,
        }
    }
}

/// An entity annotated with the number of active extensions referencing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithCount<T> {
    #[serde(flatten)]
    pub item: T,
    pub count: usize,
}
