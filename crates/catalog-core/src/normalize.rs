//! Coercion of loosely-typed input into canonical records.
//!
//! Both database rows and static JSON entries pass through these helpers
//! before leaving the catalog layer. Nothing here fails: malformed fields
//! degrade to empty arrays or `None`.

use serde_json::{Map, Value};

use crate::models::{Category, DeveloperInfo, Extension, Topic};

/// Coerce an optional JSON value into a list of strings.
///
/// Non-array input yields an empty list; non-string items are dropped.
pub fn parse_string_array(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Same as [`parse_string_array`] for a JSON-encoded text column.
pub fn parse_json_string_array(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(text) {
        Ok(value) => parse_string_array(Some(&value)),
        Err(_) => Vec::new(),
    }
}

/// Keep a rating only if it is a finite number.
pub fn finite_rating(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Read a rating from JSON, accepting numbers and numeric strings.
pub fn parse_rating(value: Option<&Value>) -> Option<f64> {
    let raw = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    finite_rating(raw)
}

/// Parse a JSON-encoded developer column.
pub fn parse_developer_json(text: Option<&str>) -> Option<DeveloperInfo> {
    let value: Value = serde_json::from_str(text?).ok()?;
    developer_from_json(&value)
}

/// Read embedded developer contact details. Returns `None` unless at least
/// one field is present.
pub fn developer_from_json(value: &Value) -> Option<DeveloperInfo> {
    let obj = value.as_object()?;
    let info = DeveloperInfo {
        name: opt_string(obj, "name"),
        website: opt_string(obj, "website"),
        email: opt_string(obj, "email"),
    };
    if info == DeveloperInfo::default() {
        None
    } else {
        Some(info)
    }
}

fn opt_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn opt_i64(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalize one entry of the static JSON dataset.
///
/// Returns `None` for entries without a usable slug. A missing `id` falls
/// back to the slug and a missing `name` to the title-cased slug.
/// `isActive` is true unless it is literally `false`.
pub fn extension_from_json(value: &Value) -> Option<Extension> {
    let obj = value.as_object()?;
    let slug = opt_string(obj, "slug")?;
    let id = opt_string(obj, "id").unwrap_or_else(|| slug.clone());
    let name = opt_string(obj, "name").unwrap_or_else(|| title_case(&slug));

    let mut ext = Extension::new(id, slug, name);
    ext.description = opt_string(obj, "description").unwrap_or_default();
    ext.overview = opt_string(obj, "overview");
    ext.category = opt_string(obj, "category");
    ext.tags = parse_string_array(obj.get("tags"));
    ext.topics = parse_string_array(obj.get("topics"));
    ext.icon = opt_string(obj, "icon");
    ext.screenshots = parse_string_array(obj.get("screenshots"));
    ext.features = parse_string_array(obj.get("features"));
    ext.languages = parse_string_array(obj.get("languages"));
    ext.chrome_store_url = opt_string(obj, "chromeStoreUrl");
    ext.firefox_addon_url = opt_string(obj, "firefoxAddonUrl");
    ext.website = opt_string(obj, "website");
    ext.url = opt_string(obj, "url");
    ext.privacy_policy = opt_string(obj, "privacyPolicy");
    ext.support_site = opt_string(obj, "supportSite");
    ext.is_active = obj.get("isActive").and_then(Value::as_bool) != Some(false);
    ext.is_popular = obj.get("isPopular").and_then(Value::as_bool) == Some(true);
    ext.rating = parse_rating(obj.get("rating"));
    ext.rating_count = opt_i64(obj, "ratingCount");
    ext.users = opt_string(obj, "users");
    ext.version = opt_string(obj, "version");
    ext.updated = opt_string(obj, "updated");
    ext.size = opt_string(obj, "size");
    ext.developer = obj.get("developer").and_then(developer_from_json);
    ext.developer_username = opt_string(obj, "developerUsername");
    Some(ext)
}

/// Normalize a whole JSON dataset, skipping entries without a slug.
pub fn extensions_from_json(value: &Value) -> Vec<Extension> {
    match value {
        Value::Array(items) => items.iter().filter_map(extension_from_json).collect(),
        _ => Vec::new(),
    }
}

/// Turn a slug into a display name: `password-manager` → `Password Manager`.
pub fn title_case(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Placeholder topic for a slug that extensions reference but no topic row
/// describes yet.
pub fn placeholder_topic(slug: &str) -> Topic {
    Topic {
        id: format!("topic_{}", slug),
        slug: slug.to_string(),
        name: title_case(slug),
        description: None,
        ahrefs_sv: None,
        ahrefs_kd: None,
        updated_at: None,
    }
}

/// Placeholder category derived from an extension's category slug.
pub fn placeholder_category(slug: &str) -> Category {
    Category {
        id: format!("category_{}", slug),
        slug: slug.to_string(),
        name: title_case(slug),
        description: None,
        icon: None,
        updated_at: None,
    }
}
