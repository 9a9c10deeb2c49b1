//! Folio CLI
//!
//! Thin wrapper around folio-core for browsing a projects export from the
//! command line.
//!
//! ## Usage
//!
//! ```bash
//! # List projects, newest first
//! folio --source projects.json list
//!
//! # Search and filter
//! folio --source projects.json list --search bet --category Web --sort a-z
//!
//! # Featured section (limited query)
//! folio --source projects.json list --featured
//!
//! # Category pills
//! folio --source projects.json categories
//!
//! # Detail view
//! folio --source projects.json show <id>
//!
//! # Follow the export file and reprint on every change
//! FOLIO_SOURCE=projects.json folio watch --category Branding
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{
    CategoryFilter, CollectionQuery, FolioConfig, Gallery, GalleryEvent, GalleryState, JsonFileStore,
    ProjectFetcher, ProjectId, ProjectRecord, RevealTracker, SortOrder, ViewMode,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

/// Folio - Project Gallery
#[derive(Parser)]
#[command(name = "folio")]
#[command(version = "0.1.0")]
#[command(about = "Folio - browse, search and filter a portfolio project collection")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Projects export (JSON)
    #[arg(short, long, global = true, env = "FOLIO_SOURCE")]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects after search, category filter and sort
    List {
        /// Search text (title, summary, tags)
        #[arg(long)]
        search: Option<String>,

        /// Category label ("All" for no filter)
        #[arg(long)]
        category: Option<String>,

        /// Sort key: most-recent, oldest, a-z, z-a, category
        #[arg(long, default_value = "most-recent")]
        sort: String,

        /// Layout: grid or list
        #[arg(long, default_value = "grid")]
        view: String,

        /// Show at most this many projects
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Read only the featured selection (see `featured_limit`)
        #[arg(long)]
        featured: bool,
    },

    /// List category pills
    Categories,

    /// Show one project
    Show {
        /// Project id
        id: String,
    },

    /// Follow the export and reprint on every change
    Watch {
        /// Search text (title, summary, tags)
        #[arg(long)]
        search: Option<String>,

        /// Category label ("All" for no filter)
        #[arg(long)]
        category: Option<String>,

        /// Sort key: most-recent, oldest, a-z, z-a, category
        #[arg(long, default_value = "most-recent")]
        sort: String,

        /// Exit after this many deliveries
        #[arg(long)]
        count: Option<usize>,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<FolioConfig> {
    match path {
        Some(path) => FolioConfig::load(path)
            .with_context(|| format!("Invalid config file {}", path.display())),
        None => Ok(FolioConfig::default()),
    }
}

fn fetcher(source: Option<PathBuf>, config: &FolioConfig, query: CollectionQuery) -> Result<ProjectFetcher> {
    let source = source.context("No projects export given: pass --source or set FOLIO_SOURCE")?;
    debug!(source = %source.display(), ?query, "Using projects export");
    let store = JsonFileStore::new(source).with_poll_interval(config.poll_interval());
    Ok(ProjectFetcher::new(Arc::new(store), query))
}

fn parse_view(s: &str) -> Result<ViewMode> {
    s.parse()
        .map_err(|e| anyhow::anyhow!("Invalid view '{}': {}", s, e))
}

fn print_projects(records: &[ProjectRecord], view: ViewMode, config: &FolioConfig) {
    if records.is_empty() {
        println!("No projects found.");
        println!("Try adjusting your search or category filters.");
        return;
    }

    println!("Projects ({}):", records.len());
    println!();
    for record in records {
        let categories = if record.categories.is_empty() {
            String::new()
        } else {
            format!(" [{}]", record.categories.join(", "))
        };
        let date = record
            .date
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        println!("  {} {}{}{}", record.id, record.display_title(), categories, date);

        if view == ViewMode::List {
            println!("      {}", record.excerpt(config.excerpt_chars));
            let tags = record.preview_tags(config.preview_tags);
            if !tags.is_empty() {
                println!("      Tags: {}", tags.join(", "));
            }
        }
    }
}

fn print_project(record: &ProjectRecord, config: &FolioConfig) {
    println!("Project: {}", record.display_title());
    println!("  ID: {}", record.id);
    if !record.categories.is_empty() {
        println!("  Categories: {}", record.categories.join(", "));
    }
    if !record.tags.is_empty() {
        println!("  Tags: {}", record.tags.join(", "));
    }
    if let Some(date) = &record.date {
        println!("  Date: {}", date);
    }
    println!("  Image: {}", record.display_image(&config.placeholder_image));
    if let Some(prototype) = &record.prototype_url {
        println!("  Prototype: {}", prototype);
    }
    if let Some(stats) = &record.stats {
        println!(
            "  Stats: drop {}%, ctr {}%, growth {}%",
            stats.drop, stats.ctr, stats.growth
        );
    }
    let extra = record.extra_gallery();
    if !extra.is_empty() {
        println!("  Gallery:");
        for image in extra {
            println!("    {}", image);
        }
    }
    println!();
    if record.description.trim().is_empty() {
        println!("No description available.");
    } else {
        println!("{}", record.description);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_ref())?;
    let query = match &cli.command {
        Commands::List { featured: true, .. } => config.featured_query(),
        _ => config.collection_query(),
    };
    let fetcher = fetcher(cli.source, &config, query)?;

    match cli.command {
        Commands::List {
            search,
            category,
            sort,
            view,
            limit,
            json,
            ..
        } => {
            let view = parse_view(&view)?;
            let records = fetcher
                .fetch_all()
                .await
                .context("Could not load projects")?;

            let mut state = GalleryState::new(RevealTracker::always_revealed(config.reveal_options()));
            state.apply_snapshot(Ok(records));
            if let Some(search) = search {
                state.set_search_text(search.clone());
                state.apply_debounced_search(search);
            }
            if let Some(category) = category {
                state.set_category(CategoryFilter::from_label(&category));
            }
            state.set_sort_order(SortOrder::parse(&sort));
            state.set_view_mode(view);

            let mut visible = state.visible().to_vec();
            if let Some(limit) = limit {
                visible.truncate(limit);
            }
            info!(count = visible.len(), sort = %state.query().sort_order(), "Listing projects");

            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                print_projects(&visible, view, &config);
            }
        }

        Commands::Categories => {
            let records = fetcher
                .fetch_all()
                .await
                .context("Could not load projects")?;
            let mut state = GalleryState::new(RevealTracker::always_revealed(config.reveal_options()));
            state.apply_snapshot(Ok(records));
            for pill in state.categories().pills() {
                println!("{}", pill);
            }
        }

        Commands::Show { id } => {
            let record = fetcher.require_project(&ProjectId::new(id)).await?;
            print_project(&record, &config);
        }

        Commands::Watch {
            search,
            category,
            sort,
            count,
        } => {
            let gallery = Gallery::new(fetcher, &config, None);
            if let Some(search) = search {
                gallery.submit_search(search);
            }
            if let Some(category) = category {
                gallery.set_category(CategoryFilter::from_label(&category));
            }
            gallery.set_sort_order(SortOrder::parse(&sort));

            let mut events = gallery.subscribe_events();
            gallery.watch()?;
            println!("Watching for changes (Ctrl+C to stop)...");

            let mut deliveries = 0usize;
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        println!();
                        println!("Received shutdown signal...");
                        break;
                    }
                    event = events.recv() => match event {
                        Ok(GalleryEvent::Loaded { count: total }) => {
                            deliveries += 1;
                            println!();
                            println!("Update {} ({} in collection)", deliveries, total);
                            print_projects(&gallery.visible(), ViewMode::Grid, &config);
                        }
                        Ok(GalleryEvent::LoadFailed { message }) => {
                            deliveries += 1;
                            eprintln!("Could not load projects: {}", message);
                        }
                        Ok(_) => continue,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Watch output fell behind");
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                if count.is_some_and(|max| deliveries >= max) {
                    break;
                }
            }

            gallery.shutdown();
        }
    }

    Ok(())
}
