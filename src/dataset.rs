//! Static snapshot loading.
//!
//! The snapshot is the bundled JSON dataset (or a file named in
//! `[snapshot].path`), optionally merged with per-product files from
//! `[snapshot].products_dir`. It is loaded once at startup and shared
//! read-only for the life of the process.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::info;

use catalog_core::aggregate::merge_by_slug;
use catalog_core::models::Extension;
use catalog_core::normalize::extensions_from_json;
use catalog_core::source::StaticSnapshotSource;

use crate::config::SnapshotConfig;
use crate::products::load_products;

/// Dataset compiled into the binary, used when no snapshot path is set.
const BUNDLED_DATASET: &str = include_str!("../data/extensions.json");

/// Build the static snapshot described by `config`.
pub fn load_snapshot(config: &SnapshotConfig) -> Result<StaticSnapshotSource> {
    let base = match &config.path {
        Some(path) => load_dataset_file(path)?,
        None => parse_dataset(BUNDLED_DATASET).context("Bundled dataset is invalid")?,
    };
    let base_len = base.len();

    let extensions = match &config.products_dir {
        Some(dir) => merge_by_slug(base, load_products(dir)),
        None => base,
    };

    info!(
        dataset = base_len,
        total = extensions.len(),
        "static snapshot loaded"
    );
    Ok(StaticSnapshotSource::new(extensions))
}

pub fn load_dataset_file(path: &Path) -> Result<Vec<Extension>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    parse_dataset(&text).with_context(|| format!("Invalid snapshot: {}", path.display()))
}

/// Parse a JSON array of extension objects. Entries without a slug are
/// dropped; a document that is not an array is an error.
pub fn parse_dataset(text: &str) -> Result<Vec<Extension>> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_array() {
        bail!("expected a JSON array of extensions");
    }
    Ok(extensions_from_json(&value))
}
