use anyhow::Result;

use catalog_core::source::CatalogSource;

use crate::catalog::open_source;
use crate::config::Config;

/// Report which source serves reads and how large the snapshot is.
pub async fn report_source(config: &Config) -> Result<()> {
    let source = open_source(config).await?;

    let db_status = match &config.db {
        Some(_) if source.has_primary() => "CONNECTED",
        Some(_) => "UNREACHABLE",
        None => "NOT CONFIGURED",
    };
    let snapshot_origin = match &config.snapshot.path {
        Some(path) => path.display().to_string(),
        None => "(bundled)".to_string(),
    };

    println!("{:<12} {:<16} DETAIL", "SOURCE", "STATUS");
    match &config.db {
        Some(db) => println!("{:<12} {:<16} {}", "database", db_status, db.path.display()),
        None => println!("{:<12} {:<16}", "database", db_status),
    }
    println!(
        "{:<12} {:<16} {} listings from {}",
        "snapshot",
        "OK",
        source.snapshot().len(),
        snapshot_origin
    );
    println!();
    println!("serving reads from: {}", source.name());

    Ok(())
}
