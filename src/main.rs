//! # Extension Catalog CLI (`catalog`)
//!
//! ## Usage
//!
//! ```bash
//! catalog --config ./config/catalog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog init` | Create the SQLite database and catalog tables |
//! | `catalog source` | Show whether the database or the snapshot serves reads |
//! | `catalog list <kind>` | List categories, topics, extensions, or featured extensions |
//! | `catalog get <developer> <slug>` | Show one extension |
//! | `catalog sitemap <kind>` | Print a sitemap document |
//! | `catalog serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Featured listings from the bundled snapshot (no config needed)
//! catalog list featured --limit 5
//!
//! # Topics with the number of active extensions in each
//! catalog list topics --counts
//!
//! # Second page of the extensions sitemap
//! catalog sitemap extensions --page 2
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use extension_catalog::config::{self, Config};
use extension_catalog::list::ListKind;
use extension_catalog::sitemap::SitemapKind;
use extension_catalog::{get, list, migrate, server, sitemap, sources};

/// Extension catalog: read-only access to categories, topics, and browser
/// extension listings backed by SQLite with a static JSON fallback.
#[derive(Parser)]
#[command(name = "catalog", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the file does not exist the catalog runs snapshot-only on the
    /// bundled dataset.
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the SQLite database and catalog tables. Idempotent.
    Init,

    /// Report which source serves reads.
    Source,

    /// List catalog entities.
    List {
        #[arg(value_enum)]
        kind: ListKind,

        /// Maximum number of rows.
        #[arg(long)]
        limit: Option<usize>,

        /// Include active extension counts (categories and topics).
        #[arg(long)]
        counts: bool,
    },

    /// Show one extension by developer segment and slug.
    Get { developer: String, slug: String },

    /// Print a sitemap document to stdout.
    Sitemap {
        #[arg(value_enum)]
        kind: SitemapKind,

        /// Page of the extensions sitemap (1-based).
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_exists = cli.config.exists();
    let cfg = if config_exists {
        config::load_config(&cli.config)?
    } else {
        Config::minimal()
    };

    init_tracing(&cfg.log.level);
    if !config_exists {
        warn!(
            path = %cli.config.display(),
            "config file not found; using bundled snapshot only"
        );
    }

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Source => {
            sources::report_source(&cfg).await?;
        }
        Commands::List {
            kind,
            limit,
            counts,
        } => {
            list::run_list(&cfg, kind, limit, counts).await?;
        }
        Commands::Get { developer, slug } => {
            get::run_get(&cfg, &developer, &slug).await?;
        }
        Commands::Sitemap { kind, page } => {
            sitemap::run_sitemap(&cfg, kind, page).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
