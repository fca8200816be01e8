//! Site-relative URL builders shared by the HTTP layer and the sitemap.

use crate::models::Extension;

/// `/extensions/{developer}/{slug}`, using the extension id when no
/// developer slug is known.
pub fn extension_url(extension: &Extension) -> String {
    format!(
        "/extensions/{}/{}",
        extension.developer_segment(),
        extension.slug
    )
}

pub fn topic_url(topic_slug: &str) -> String {
    format!("/topic/{}", topic_slug)
}

/// "Best extensions for X" landing page.
pub fn best_url(topic_slug: &str) -> String {
    format!("/best/{}", topic_slug)
}

pub fn category_url(category_slug: &str) -> String {
    format!("/categories/{}", category_slug)
}
