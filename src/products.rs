use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use catalog_core::models::Extension;
use catalog_core::normalize::parse_string_array;

/// One supplementary product file.
#[derive(Debug, Deserialize)]
struct ProductFile {
    slug: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Option<Value>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

impl ProductFile {
    fn into_extension(self) -> Extension {
        let categories = parse_string_array(self.categories.as_ref());
        let mut ext = Extension::new(self.slug.clone(), self.slug, self.name);
        ext.description = self.description.unwrap_or_default();
        ext.category = categories.first().cloned();
        ext.tags = categories;
        ext.url = self.url;
        ext.icon = self.icon;
        ext
    }
}

/// Read every `*.json` file directly inside `dir` as a product listing.
///
/// Files are visited in name order so later files win on duplicate slugs.
/// Unreadable or malformed files are skipped; a missing directory yields an
/// empty list.
pub fn load_products(dir: &Path) -> Vec<Extension> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "products directory not found; skipping");
        return Vec::new();
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut products = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "failed to read products directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some("json")
        {
            continue;
        }

        match read_product(path) {
            Ok(product) => products.push(product.into_extension()),
            Err(e) => warn!(file = %path.display(), error = %e, "skipping malformed product file"),
        }
    }

    debug!(dir = %dir.display(), count = products.len(), "loaded product files");
    products
}

fn read_product(path: &Path) -> anyhow::Result<ProductFile> {
    let text = std::fs::read_to_string(path)?;
    let product: ProductFile = serde_json::from_str(&text)?;
    if product.slug.trim().is_empty() {
        anyhow::bail!("product slug is empty");
    }
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_loads_valid_and_skips_malformed() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        fs::write(
            dir.join("a.json"),
            r#"{"slug": "ytdl", "name": "YouTube Downloader", "description": "Save videos",
                "categories": ["downloader", 7], "url": "https://example.com", "icon": "/i.png"}"#,
        )
        .unwrap();
        fs::write(dir.join("b.json"), "{ not json").unwrap();
        fs::write(dir.join("c.json"), r#"{"name": "No slug"}"#).unwrap();
        fs::write(dir.join("d.json"), r#"{"slug": " ", "name": "Blank"}"#).unwrap();
        fs::write(dir.join("notes.txt"), r#"{"slug": "txt", "name": "Txt"}"#).unwrap();

        let products = load_products(dir);
        assert_eq!(products.len(), 1);
        let ytdl = &products[0];
        assert_eq!(ytdl.id, "ytdl");
        assert_eq!(ytdl.category.as_deref(), Some("downloader"));
        assert_eq!(ytdl.tags, vec!["downloader".to_string()]);
        assert_eq!(ytdl.url.as_deref(), Some("https://example.com"));
        assert!(ytdl.is_active);
    }

    #[test]
    fn test_later_files_come_last() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("2.json"), r#"{"slug": "x", "name": "Second"}"#).unwrap();
        fs::write(tmp.path().join("1.json"), r#"{"slug": "x", "name": "First"}"#).unwrap();
        let products = load_products(tmp.path());
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        assert!(load_products(Path::new("/definitely/not/here")).is_empty());
    }
}
