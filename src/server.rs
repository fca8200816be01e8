//! Read-only HTTP server over the catalog.
//!
//! Every request builds its own [`Catalog`] on top of the shared source, so
//! loaders are memoized for exactly one request.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (version and serving source) |
//! | `GET`  | `/api/extensions` | Featured extensions (`?limit=`) |
//! | `GET`  | `/api/extensions/{developer}/{slug}` | One extension plus its renderable topics |
//! | `GET`  | `/api/categories` | Categories with counts |
//! | `GET`  | `/api/categories/{slug}` | Category plus its ranked extensions (404 when it has none) |
//! | `GET`  | `/api/topics` | Topics with counts |
//! | `GET`  | `/api/topics/{slug}` | Topic plus its ranked extensions (404 when it has none) |
//! | `GET`  | `/sitemap-index.xml` and friends | XML sitemaps |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "topic not found: vpn" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use catalog_core::models::{Category, Extension, Topic, WithCount};
use catalog_core::source::CatalogSource;

use crate::catalog::{open_source, Catalog};
use crate::config::Config;
use crate::sitemap::{render_index, render_urlset, SitemapBuilder, SitemapEntry};

#[derive(Clone)]
struct AppState {
    source: Arc<dyn CatalogSource>,
    config: Arc<Config>,
}

impl AppState {
    fn catalog(&self) -> Catalog {
        Catalog::new(self.source.clone())
    }
}

/// Starts the HTTP server on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let source: Arc<dyn CatalogSource> = open_source(config).await?;
    let app = router(source, Arc::new(config.clone()));

    let bind_addr = &config.server.bind;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("catalog server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router over an already opened source.
pub fn router(source: Arc<dyn CatalogSource>, config: Arc<Config>) -> Router {
    let state = AppState { source, config };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/extensions", get(handle_featured))
        .route("/api/extensions/{developer}/{slug}", get(handle_extension))
        .route("/api/categories", get(handle_categories))
        .route("/api/categories/{slug}", get(handle_category))
        .route("/api/topics", get(handle_topics))
        .route("/api/topics/{slug}", get(handle_topic))
        .route("/sitemap-index.xml", get(handle_sitemap_index))
        .route("/pages-sitemap.xml", get(handle_pages_sitemap))
        .route("/extensions-sitemap.xml", get(handle_extensions_sitemap))
        .route("/best-sitemap.xml", get(handle_best_sitemap))
        .route("/categories-sitemap.xml", get(handle_categories_sitemap))
        // Paged extension sitemaps: extensions-sitemap-{n}.xml
        .route("/{file}", get(handle_paged_sitemap))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    error!(error = %err, "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    source: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: state.source.name().to_string(),
    })
}

// ============ /api/extensions ============

#[derive(Deserialize)]
struct FeaturedQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct ExtensionsResponse {
    extensions: Vec<Extension>,
}

async fn handle_featured(
    State(state): State<AppState>,
    Query(query): Query<FeaturedQuery>,
) -> Result<Json<ExtensionsResponse>, AppError> {
    let limit = query.limit.unwrap_or(state.config.server.featured_limit);
    if limit == 0 {
        return Err(bad_request("limit must be >= 1"));
    }
    let extensions = state.catalog().featured_extensions(limit).await;
    Ok(Json(ExtensionsResponse { extensions }))
}

#[derive(Serialize)]
struct ExtensionDetailResponse {
    extension: Extension,
    topics: Vec<Topic>,
}

async fn handle_extension(
    State(state): State<AppState>,
    Path((developer, slug)): Path<(String, String)>,
) -> Result<Json<ExtensionDetailResponse>, AppError> {
    let catalog = state.catalog();
    let extension = catalog
        .extension_by_developer_and_slug(&developer, &slug)
        .await
        .ok_or_else(|| not_found(format!("extension not found: {}/{}", developer, slug)))?;
    let topics = catalog.renderable_topics(&extension).await;
    Ok(Json(ExtensionDetailResponse { extension, topics }))
}

// ============ /api/categories ============

#[derive(Serialize)]
struct CategoriesResponse {
    categories: Vec<WithCount<Category>>,
}

async fn handle_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    let categories = state.catalog().categories_with_counts().await;
    Json(CategoriesResponse { categories })
}

#[derive(Serialize)]
struct CategoryDetailResponse {
    category: Category,
    extensions: Vec<Extension>,
}

async fn handle_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetailResponse>, AppError> {
    let catalog = state.catalog();
    let (category, extensions) = tokio::join!(
        catalog.category_by_slug(&slug),
        catalog.extensions_by_category(&slug)
    );
    let category = category.ok_or_else(|| not_found(format!("category not found: {}", slug)))?;
    if extensions.is_empty() {
        return Err(not_found(format!("category has no active extensions: {}", slug)));
    }
    Ok(Json(CategoryDetailResponse {
        category,
        extensions,
    }))
}

// ============ /api/topics ============

#[derive(Serialize)]
struct TopicsResponse {
    topics: Vec<WithCount<Topic>>,
}

async fn handle_topics(State(state): State<AppState>) -> Json<TopicsResponse> {
    let topics = state.catalog().topics_with_counts().await;
    Json(TopicsResponse { topics })
}

#[derive(Serialize)]
struct TopicDetailResponse {
    topic: Topic,
    extensions: Vec<Extension>,
}

async fn handle_topic(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TopicDetailResponse>, AppError> {
    let catalog = state.catalog();
    let (topic, extensions) = tokio::join!(
        catalog.topic_by_slug(&slug),
        catalog.extensions_by_topic(&slug)
    );
    let topic = topic.ok_or_else(|| not_found(format!("topic not found: {}", slug)))?;
    if extensions.is_empty() {
        return Err(not_found(format!("topic has no active extensions: {}", slug)));
    }
    Ok(Json(TopicDetailResponse { topic, extensions }))
}

// ============ Sitemaps ============

fn xml_response(body: anyhow::Result<String>) -> Result<Response, AppError> {
    let xml = body.map_err(internal)?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}

fn urlset_response(entries: Vec<SitemapEntry>) -> Result<Response, AppError> {
    xml_response(render_urlset(&entries))
}

async fn handle_sitemap_index(State(state): State<AppState>) -> Result<Response, AppError> {
    let catalog = state.catalog();
    let builder = SitemapBuilder::new(&catalog, &state.config.site.base_url, Utc::now());
    xml_response(render_index(&builder.index_entries().await))
}

async fn handle_pages_sitemap(State(state): State<AppState>) -> Result<Response, AppError> {
    let catalog = state.catalog();
    let builder = SitemapBuilder::new(&catalog, &state.config.site.base_url, Utc::now());
    urlset_response(builder.core_page_entries())
}

async fn handle_extensions_sitemap(State(state): State<AppState>) -> Result<Response, AppError> {
    let catalog = state.catalog();
    let builder = SitemapBuilder::new(&catalog, &state.config.site.base_url, Utc::now());
    urlset_response(builder.extension_page(1).await)
}

async fn handle_best_sitemap(State(state): State<AppState>) -> Result<Response, AppError> {
    let catalog = state.catalog();
    let builder = SitemapBuilder::new(&catalog, &state.config.site.base_url, Utc::now());
    urlset_response(builder.topic_entries().await)
}

async fn handle_categories_sitemap(State(state): State<AppState>) -> Result<Response, AppError> {
    let catalog = state.catalog();
    let builder = SitemapBuilder::new(&catalog, &state.config.site.base_url, Utc::now());
    urlset_response(builder.category_entries().await)
}

/// Page number from `extensions-sitemap-{n}.xml`, for `n >= 2`.
fn sitemap_page(file: &str) -> Option<usize> {
    let page: usize = file
        .strip_prefix("extensions-sitemap-")?
        .strip_suffix(".xml")?
        .parse()
        .ok()?;
    (page >= 2).then_some(page)
}

async fn handle_paged_sitemap(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let page = sitemap_page(&file).ok_or_else(|| not_found(format!("no such page: /{}", file)))?;
    let catalog = state.catalog();
    let builder = SitemapBuilder::new(&catalog, &state.config.site.base_url, Utc::now());
    let entries = builder.extension_page(page).await;
    if entries.is_empty() {
        return Err(not_found(format!("sitemap page {} is empty", page)));
    }
    urlset_response(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_page_parsing() {
        assert_eq!(sitemap_page("extensions-sitemap-2.xml"), Some(2));
        assert_eq!(sitemap_page("extensions-sitemap-17.xml"), Some(17));
        assert_eq!(sitemap_page("extensions-sitemap-1.xml"), None);
        assert_eq!(sitemap_page("extensions-sitemap-x.xml"), None);
        assert_eq!(sitemap_page("robots.txt"), None);
    }
}
