//! Listing commands: `catalog list <categories|topics|extensions|featured>`.

use anyhow::Result;
use clap::ValueEnum;

use catalog_core::models::Extension;

use crate::catalog::{open_source, Catalog};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    Categories,
    Topics,
    Extensions,
    Featured,
}

/// Print one listing to stdout.
///
/// `limit` caps the number of rows; for `featured` it defaults to
/// `[server].featured_limit`. `counts` adds the number of active
/// extensions to category and topic rows.
pub async fn run_list(
    config: &Config,
    kind: ListKind,
    limit: Option<usize>,
    counts: bool,
) -> Result<()> {
    let catalog = Catalog::new(open_source(config).await?);
    let cap = limit.unwrap_or(usize::MAX);

    match kind {
        ListKind::Categories if counts => {
            println!("{:<28} {:<32} COUNT", "SLUG", "NAME");
            for c in catalog.categories_with_counts().await.into_iter().take(cap) {
                println!("{:<28} {:<32} {}", c.item.slug, c.item.name, c.count);
            }
        }
        ListKind::Categories => {
            println!("{:<28} NAME", "SLUG");
            for c in catalog.categories().await.into_iter().take(cap) {
                println!("{:<28} {}", c.slug, c.name);
            }
        }
        ListKind::Topics if counts => {
            println!("{:<28} {:<32} COUNT", "SLUG", "NAME");
            for t in catalog.topics_with_counts().await.into_iter().take(cap) {
                println!("{:<28} {:<32} {}", t.item.slug, t.item.name, t.count);
            }
        }
        ListKind::Topics => {
            println!("{:<28} NAME", "SLUG");
            for t in catalog.topics().await.into_iter().take(cap) {
                println!("{:<28} {}", t.slug, t.name);
            }
        }
        ListKind::Extensions => {
            let extensions: Vec<Extension> =
                catalog.active_extensions().await.into_iter().take(cap).collect();
            print_extensions(&extensions);
        }
        ListKind::Featured => {
            let limit = limit.unwrap_or(config.server.featured_limit);
            print_extensions(&catalog.featured_extensions(limit).await);
        }
    }

    Ok(())
}

fn print_extensions(extensions: &[Extension]) {
    println!("{:<32} {:<20} {:<8} POPULAR", "SLUG", "CATEGORY", "RATING");
    for ext in extensions {
        let rating = ext
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:<20} {:<8} {}",
            ext.slug,
            ext.category.as_deref().unwrap_or("-"),
            rating,
            ext.is_popular
        );
    }
    println!();
    println!("{} extension(s)", extensions.len());
}
