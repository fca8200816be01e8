//! # Catalog Core
//!
//! Shared logic for the extension catalog: data models, record
//! normalization, the [`source::CatalogSource`] abstraction, the static
//! snapshot source, derived aggregation, and URL helpers.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. The database
//! source, configuration, and HTTP surface live in the `extension-catalog`
//! application crate.

pub mod aggregate;
pub mod models;
pub mod normalize;
pub mod source;
pub mod urls;
