//! XML sitemap generation.
//!
//! Builds `<urlset>` documents for the home page, extension detail pages,
//! "best" topic pages and category pages, plus the `<sitemapindex>` that
//! points at them. Topic and category entries are only emitted when at
//! least one active extension references them.
//!
//! | File | Contents |
//! |------|----------|
//! | `sitemap-index.xml` | index of the non-empty sitemaps below |
//! | `pages-sitemap.xml` | core pages |
//! | `extensions-sitemap.xml`, `extensions-sitemap-{n}.xml` | extension pages, [`SITEMAP_PAGE_SIZE`] per file |
//! | `best-sitemap.xml` | topic pages |
//! | `categories-sitemap.xml` | category pages |

use anyhow::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use catalog_core::urls::{best_url, category_url, extension_url};

use crate::catalog::{open_source, Catalog};
use crate::config::Config;

pub const SITEMAP_PAGE_SIZE: usize = 20_000;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Search volume above which a topic or category page gets the higher priority.
const HIGH_VOLUME_THRESHOLD: i64 = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: &'static str,
    pub priority: f64,
}

/// One `<sitemap>` line of the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub loc: String,
    pub last_modified: DateTime<Utc>,
}

/// Strip a trailing slash so paths can be appended directly.
pub fn resolve_base_url(configured: &str) -> String {
    configured.trim_end_matches('/').to_string()
}

/// Best-effort parse of an extension's free-form `updated` field.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, and store-style `March 5, 2024`.
pub fn parse_updated(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn tier_priority(search_volume: Option<i64>) -> f64 {
    match search_volume {
        Some(sv) if sv > HIGH_VOLUME_THRESHOLD => 0.9,
        _ => 0.7,
    }
}

/// Builds sitemap entries from a request-scoped [`Catalog`].
pub struct SitemapBuilder<'a> {
    catalog: &'a Catalog,
    base_url: String,
    now: DateTime<Utc>,
}

impl<'a> SitemapBuilder<'a> {
    pub fn new(catalog: &'a Catalog, base_url: &str, now: DateTime<Utc>) -> Self {
        Self {
            catalog,
            base_url: resolve_base_url(base_url),
            now,
        }
    }

    pub fn core_page_entries(&self) -> Vec<SitemapEntry> {
        vec![SitemapEntry {
            loc: format!("{}/", self.base_url),
            last_modified: self.now,
            change_frequency: "daily",
            priority: 1.0,
        }]
    }

    pub async fn extension_entries(&self) -> Vec<SitemapEntry> {
        self.catalog
            .active_extensions()
            .await
            .iter()
            .map(|ext| SitemapEntry {
                loc: format!("{}{}", self.base_url, extension_url(ext)),
                last_modified: ext
                    .updated
                    .as_deref()
                    .and_then(parse_updated)
                    .unwrap_or(self.now),
                change_frequency: "weekly",
                priority: if ext.is_popular { 0.8 } else { 0.6 },
            })
            .collect()
    }

    /// One page of extension entries (1-based). Page 0 and pages whose
    /// offset does not fit in `usize` are empty.
    pub async fn extension_page(&self, page: usize) -> Vec<SitemapEntry> {
        let Some(offset) = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(SITEMAP_PAGE_SIZE))
        else {
            return Vec::new();
        };
        self.extension_entries()
            .await
            .into_iter()
            .skip(offset)
            .take(SITEMAP_PAGE_SIZE)
            .collect()
    }

    pub async fn topic_entries(&self) -> Vec<SitemapEntry> {
        self.catalog
            .topics_with_counts()
            .await
            .into_iter()
            .filter(|t| t.count > 0)
            .map(|t| SitemapEntry {
                loc: format!("{}{}", self.base_url, best_url(&t.item.slug)),
                last_modified: self.stamp(t.item.updated_at),
                change_frequency: "weekly",
                priority: tier_priority(t.item.ahrefs_sv),
            })
            .collect()
    }

    /// Categories carry no search volume, so they always get the base tier.
    pub async fn category_entries(&self) -> Vec<SitemapEntry> {
        self.catalog
            .categories_with_counts()
            .await
            .into_iter()
            .filter(|c| c.count > 0)
            .map(|c| SitemapEntry {
                loc: format!("{}{}", self.base_url, category_url(&c.item.slug)),
                last_modified: self.stamp(c.item.updated_at),
                change_frequency: "weekly",
                priority: tier_priority(None),
            })
            .collect()
    }

    /// Index over every non-empty sitemap, each stamped with the newest
    /// `lastmod` among its entries.
    pub async fn index_entries(&self) -> Vec<IndexEntry> {
        let core = self.core_page_entries();
        let (extensions, topics, categories) = tokio::join!(
            self.extension_entries(),
            self.topic_entries(),
            self.category_entries()
        );

        let mut index = Vec::new();
        if let Some(lastmod) = latest(&core) {
            index.push(self.index_entry("pages-sitemap.xml", lastmod));
        }
        if let Some(lastmod) = latest(&extensions) {
            index.push(self.index_entry("extensions-sitemap.xml", lastmod));
            let pages = extensions.len().div_ceil(SITEMAP_PAGE_SIZE);
            for page in 2..=pages {
                index.push(self.index_entry(&format!("extensions-sitemap-{}.xml", page), lastmod));
            }
        }
        if let Some(lastmod) = latest(&topics) {
            index.push(self.index_entry("best-sitemap.xml", lastmod));
        }
        if let Some(lastmod) = latest(&categories) {
            index.push(self.index_entry("categories-sitemap.xml", lastmod));
        }
        index
    }

    /// Row timestamp when recorded, otherwise the build time.
    fn stamp(&self, updated_at: Option<i64>) -> DateTime<Utc> {
        updated_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or(self.now)
    }

    fn index_entry(&self, file: &str, last_modified: DateTime<Utc>) -> IndexEntry {
        IndexEntry {
            loc: format!("{}/{}", self.base_url, file),
            last_modified,
        }
    }
}

fn latest(entries: &[SitemapEntry]) -> Option<DateTime<Utc>> {
    entries.iter().map(|e| e.last_modified).max()
}

fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn new_document(root: &str) -> Result<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new(root).with_attributes([("xmlns", SITEMAP_NS)]),
    ))?;
    Ok(writer)
}

fn finish_document(mut writer: Writer<Vec<u8>>, root: &str) -> Result<String> {
    writer.write_event(Event::End(BytesEnd::new(root)))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Render a `<urlset>` document. Text content is XML-escaped.
pub fn render_urlset(entries: &[SitemapEntry]) -> Result<String> {
    let mut writer = new_document("urlset")?;
    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        write_text_element(&mut writer, "lastmod", &iso(&entry.last_modified))?;
        write_text_element(&mut writer, "changefreq", entry.change_frequency)?;
        write_text_element(&mut writer, "priority", &format!("{:.1}", entry.priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }
    finish_document(writer, "urlset")
}

/// Render a `<sitemapindex>` document.
pub fn render_index(entries: &[IndexEntry]) -> Result<String> {
    let mut writer = new_document("sitemapindex")?;
    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("sitemap")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        write_text_element(&mut writer, "lastmod", &iso(&entry.last_modified))?;
        writer.write_event(Event::End(BytesEnd::new("sitemap")))?;
    }
    finish_document(writer, "sitemapindex")
}

/// Which document `catalog sitemap` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SitemapKind {
    Index,
    Pages,
    Extensions,
    Best,
    Categories,
}

/// Render one sitemap document against the configured source and print it.
pub async fn run_sitemap(config: &Config, kind: SitemapKind, page: usize) -> Result<()> {
    let catalog = Catalog::new(open_source(config).await?);
    let builder = SitemapBuilder::new(&catalog, &config.site.base_url, Utc::now());

    let xml = match kind {
        SitemapKind::Index => render_index(&builder.index_entries().await)?,
        SitemapKind::Pages => render_urlset(&builder.core_page_entries())?,
        SitemapKind::Extensions => render_urlset(&builder.extension_page(page).await)?,
        SitemapKind::Best => render_urlset(&builder.topic_entries().await)?,
        SitemapKind::Categories => render_urlset(&builder.category_entries().await)?,
    };
    println!("{}", xml);
    Ok(())
}
