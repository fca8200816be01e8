//! In-memory aggregation over extension lists.
//!
//! Used whenever counts or derived entities must be computed from the
//! snapshot rather than read from the database.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Category, Extension, Topic, WithCount};
use crate::normalize::{placeholder_category, placeholder_topic};

/// Bucket used for extensions without a category.
pub const UNCATEGORIZED: &str = "other";

/// Number of extensions per category slug.
pub fn count_by_category<'a>(
    extensions: impl IntoIterator<Item = &'a Extension>,
) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for ext in extensions {
        let key = ext.category.as_deref().unwrap_or(UNCATEGORIZED);
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Number of extensions referencing each topic slug.
pub fn count_by_topic<'a>(
    extensions: impl IntoIterator<Item = &'a Extension>,
) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for ext in extensions {
        for slug in &ext.topics {
            *counts.entry(slug.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Attach counts to entities, defaulting to zero.
pub fn with_counts<T>(
    items: Vec<T>,
    counts: &HashMap<String, usize>,
    slug_of: impl Fn(&T) -> &str,
) -> Vec<WithCount<T>> {
    items
        .into_iter()
        .map(|item| {
            let count = counts.get(slug_of(&item)).copied().unwrap_or(0);
            WithCount { item, count }
        })
        .collect()
}

/// One synthesized category per distinct category slug, sorted by name.
pub fn derive_categories<'a>(
    extensions: impl IntoIterator<Item = &'a Extension>,
) -> Vec<Category> {
    let slugs: BTreeSet<&str> = extensions
        .into_iter()
        .filter_map(|ext| ext.category.as_deref())
        .filter(|slug| !slug.is_empty())
        .collect();
    let mut categories: Vec<Category> = slugs.into_iter().map(placeholder_category).collect();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    categories
}

/// One synthesized topic per distinct referenced topic slug, sorted by name.
pub fn derive_topics<'a>(extensions: impl IntoIterator<Item = &'a Extension>) -> Vec<Topic> {
    let slugs: BTreeSet<&str> = extensions
        .into_iter()
        .flat_map(|ext| ext.topics.iter().map(String::as_str))
        .filter(|slug| !slug.is_empty())
        .collect();
    let mut topics: Vec<Topic> = slugs.into_iter().map(placeholder_topic).collect();
    topics.sort_by(|a, b| a.name.cmp(&b.name));
    topics
}

/// Sort into featured order as used by the snapshot path: popular first,
/// then rating (missing counts as 0) descending, then case-insensitive name.
/// Each name is lowercased once, not per comparison.
///
/// The database path breaks rating ties by creation time instead; see
/// `DatabaseSource::featured_extensions`.
pub fn sort_featured(extensions: &mut Vec<Extension>) {
    let mut keyed: Vec<(String, Extension)> = extensions
        .drain(..)
        .map(|ext| (ext.name.to_lowercase(), ext))
        .collect();
    keyed.sort_by(|(a_name, a), (b_name, b)| {
        b.is_popular
            .cmp(&a.is_popular)
            .then_with(|| b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0)))
            .then_with(|| a_name.cmp(b_name))
    });
    extensions.extend(keyed.into_iter().map(|(_, ext)| ext));
}

/// Merge two extension lists by slug. Later entries replace earlier ones
/// in place; new slugs are appended.
pub fn merge_by_slug(base: Vec<Extension>, extra: Vec<Extension>) -> Vec<Extension> {
    let mut merged: Vec<Extension> = Vec::with_capacity(base.len() + extra.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for ext in base.into_iter().chain(extra) {
        match index.get(&ext.slug) {
            Some(&pos) => merged[pos] = ext,
            None => {
                index.insert(ext.slug.clone(), merged.len());
                merged.push(ext);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(slug: &str, category: Option<&str>, topics: &[&str]) -> Extension {
        let mut e = Extension::new(slug, slug, slug);
        e.category = category.map(str::to_string);
        e.topics = topics.iter().map(|t| t.to_string()).collect();
        e
    }

    #[test]
    fn test_counts() {
        let exts = vec![
            ext("a", Some("productivity"), &["vpn", "privacy"]),
            ext("b", Some("productivity"), &["vpn"]),
            ext("c", None, &[]),
        ];
        let by_cat = count_by_category(&exts);
        assert_eq!(by_cat.get("productivity"), Some(&2));
        assert_eq!(by_cat.get(UNCATEGORIZED), Some(&1));

        let by_topic = count_by_topic(&exts);
        assert_eq!(by_topic.get("vpn"), Some(&2));
        assert_eq!(by_topic.get("privacy"), Some(&1));
        assert_eq!(by_topic.get("missing"), None);
    }

    #[test]
    fn test_with_counts_defaults_to_zero() {
        let topics = derive_topics(&[ext("a", None, &["vpn"])]);
        let mut counts = HashMap::new();
        counts.insert("other".to_string(), 5);
        let annotated = with_counts(topics, &counts, |t| t.slug.as_str());
        assert_eq!(annotated.len(), 1);
        assert_eq!(annotated[0].count, 0);
    }

    #[test]
    fn test_derived_entities_sorted_and_distinct() {
        let exts = vec![
            ext("a", Some("social-media"), &["zoom", "ad-blocker"]),
            ext("b", Some("accessibility"), &["ad-blocker"]),
            ext("c", Some(""), &[""]),
        ];
        let categories = derive_categories(&exts);
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Accessibility", "Social Media"]);

        let topics = derive_topics(&exts);
        let slugs: Vec<&str> = topics.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["ad-blocker", "zoom"]);
    }

    #[test]
    fn test_featured_order() {
        let mut a = Extension::new("1", "a", "beta");
        a.rating = Some(4.0);
        let mut b = Extension::new("2", "b", "Alpha");
        b.rating = Some(4.0);
        let mut c = Extension::new("3", "c", "gamma");
        c.is_popular = true;
        let mut d = Extension::new("4", "d", "delta");
        d.rating = Some(4.9);

        let mut e = Extension::new("5", "e", "ALPHA");
        e.rating = Some(4.0);

        let mut list = vec![a, e, b, c, d];
        sort_featured(&mut list);
        let slugs: Vec<&str> = list.iter().map(|e| e.slug.as_str()).collect();
        // Names equal ignoring case keep their input order.
        assert_eq!(slugs, vec!["c", "d", "e", "b", "a"]);
    }

    #[test]
    fn test_merge_last_writer_wins() {
        let base = vec![ext("a", None, &[]), ext("b", None, &[])];
        let mut replacement = ext("a", Some("tools"), &[]);
        replacement.name = "A2".to_string();
        let merged = merge_by_slug(base, vec![replacement, ext("c", None, &[])]);
        let slugs: Vec<&str> = merged.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
        assert_eq!(merged[0].name, "A2");
        assert_eq!(merged[0].category.as_deref(), Some("tools"));
    }
}
