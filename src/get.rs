//! Extension lookup for the `catalog get` command.

use anyhow::Result;

use catalog_core::urls::extension_url;

use crate::catalog::{open_source, Catalog};
use crate::config::Config;

/// Print one extension addressed by its public URL segments.
pub async fn run_get(config: &Config, developer: &str, slug: &str) -> Result<()> {
    let catalog = Catalog::new(open_source(config).await?);

    let ext = match catalog
        .extension_by_developer_and_slug(developer, slug)
        .await
    {
        Some(ext) => ext,
        None => {
            eprintln!("Error: extension not found: {}/{}", developer, slug);
            std::process::exit(1);
        }
    };
    let topics = catalog.renderable_topics(&ext).await;

    println!("--- Extension ---");
    println!("id:          {}", ext.id);
    println!("slug:        {}", ext.slug);
    println!("name:        {}", ext.name);
    println!("url:         {}", extension_url(&ext));
    if let Some(ref category) = ext.category {
        println!("category:    {}", category);
    }
    match ext.rating {
        Some(rating) => println!("rating:      {:.1}", rating),
        None => println!("rating:      (unrated)"),
    }
    if let Some(ref users) = ext.users {
        println!("users:       {}", users);
    }
    if let Some(ref updated) = ext.updated {
        println!("updated:     {}", updated);
    }
    println!("popular:     {}", ext.is_popular);
    if let Some(name) = ext.developer.as_ref().and_then(|d| d.name.as_deref()) {
        println!("developer:   {}", name);
    }
    println!();

    if !ext.description.is_empty() {
        println!("--- Description ---");
        println!("{}", ext.description);
        println!();
    }

    println!("--- Topics ({}) ---", topics.len());
    for topic in &topics {
        println!("{:<28} {}", topic.slug, topic.name);
    }

    Ok(())
}
