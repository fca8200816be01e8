//! # Extension Catalog
//!
//! Read-only data access for a browser-extension directory: categories,
//! topics, and extension listings served from SQLite when it is available
//! and from a static JSON snapshot otherwise. Every read returns a value;
//! database failures are logged and answered from the snapshot.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐
//! │ SQLite (sqlx)│   │ JSON snapshot +  │
//! │ DatabaseSrc  │   │ product files    │
//! └──────┬───────┘   └────────┬─────────┘
//!        └──────┬─────────────┘
//!               ▼
//!        ┌──────────────┐
//!        │FallbackSource│  (process-wide)
//!        └──────┬───────┘
//!               ▼
//!        ┌──────────────┐
//!        │   Catalog    │  (per request, memoized)
//!        └──────┬───────┘
//!       ┌───────┼──────────┐
//!       ▼       ▼          ▼
//!    ┌─────┐ ┌──────┐ ┌─────────┐
//!    │ CLI │ │ HTTP │ │ Sitemap │
//!    └─────┘ └──────┘ └─────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | SQLite pool setup |
//! | [`migrate`] | Local schema bootstrap |
//! | [`sqlite_source`] | Database-backed catalog source |
//! | [`dataset`] | Static snapshot loading |
//! | [`products`] | Supplementary product files |
//! | [`fallback`] | Database-then-snapshot decorator |
//! | [`catalog`] | Request-scoped, memoized catalog facade |
//! | [`sitemap`] | XML sitemap generation |
//! | [`server`] | HTTP API |
//! | [`get`], [`list`], [`sources`] | CLI commands |
//!
//! Models, normalization, aggregation, URL helpers and the
//! [`CatalogSource`](catalog_core::source::CatalogSource) trait live in the
//! `catalog-core` crate.

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod db;
pub mod fallback;
pub mod get;
pub mod list;
pub mod migrate;
pub mod products;
pub mod server;
pub mod sitemap;
pub mod sources;
pub mod sqlite_source;
