//! lorevault - command-line knowledge hub.
//!
//! Ingests URLs and files into a vault of Markdown notes with SQLite
//! metadata, then lets you browse, search and relate what you saved.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lore_core::{Error, HubConfig, PipelineEvent, Result};
use lore_db::{create_pool, init_schema, SearchMode, TagStore};
use lore_extract::Locator;
use lore_pipeline::Hub;

#[derive(Parser)]
#[command(name = "lorevault")]
#[command(author, version, about = "Personal knowledge hub: ingest, summarize, search")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the configuration file (default: ~/.lorevault.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a web article or video URL
    Ingest {
        /// The URL to ingest
        url: String,

        /// Extra context passed to the summarizer
        #[arg(long)]
        context: Option<String>,
    },

    /// Ingest a local file (pdf, docx, xlsx, csv, image, txt, md)
    File {
        /// Path of the file to ingest
        path: PathBuf,

        /// Extra context passed to the summarizer
        #[arg(long)]
        context: Option<String>,
    },

    /// List stored items, newest first
    List {
        /// Maximum number of items
        #[arg(short, long)]
        limit: Option<i64>,

        /// Filter by content type (article, video, pdf, ...)
        #[arg(short = 't', long)]
        content_type: Option<String>,
    },

    /// Search stored items
    Search {
        /// Substring to look for (case-insensitive)
        query: String,

        /// Where to match: title, tags, summary or all
        #[arg(short, long, default_value = "all")]
        mode: String,
    },

    /// Suggest items related to a stored item
    Related {
        /// Content item id
        id: i64,
    },

    /// List all tags with usage counts
    Tags,

    /// Show vault statistics
    Stats,

    /// Delete a stored item and prune unused tags
    Delete {
        /// Content item id
        id: i64,
    },

    /// Store a preference value
    PrefSet { key: String, value: String },

    /// Read a preference value
    PrefGet { key: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lorevault=info,lore_pipeline=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", e.suggested_action());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = HubConfig::load(&config_path)?;

    std::fs::create_dir_all(config.vault_dir()).map_err(|e| {
        Error::filesystem(
            format!(
                "Cannot create vault directory {}: {}",
                config.vault_dir().display(),
                e
            ),
            "Check the vault path and directory permissions.",
        )
    })?;

    let pool = create_pool(config.database_path()).await?;
    init_schema(&pool).await?;
    let hub = Hub::new(config, pool.clone())?;

    match cli.command {
        Commands::Ingest { url, context } => {
            let locator = Locator::url(&url)?;
            cmd_process(&hub, &locator, context).await?;
        }
        Commands::File { path, context } => {
            cmd_process(&hub, &Locator::file(path), context).await?;
        }
        Commands::List {
            limit,
            content_type,
        } => {
            let content_type = content_type.map(|t| t.parse()).transpose()?;
            let items = hub.store().list(limit, content_type).await?;
            for item in items {
                println!(
                    "{:>5}  {:<12} {}  {}",
                    item.id,
                    item.content_type.as_str(),
                    item.created_at.format("%Y-%m-%d"),
                    item.title
                );
            }
        }
        Commands::Search { query, mode } => {
            let items = hub.store().search(&query, parse_mode(&mode)?).await?;
            if items.is_empty() {
                println!("No matches.");
            }
            for item in items {
                println!("{:>5}  {}  [{}]", item.id, item.title, item.tags.join(", "));
            }
        }
        Commands::Related { id } => {
            let related = hub.related(id).await?;
            if related.is_empty() {
                println!("No related items above the score threshold.");
            }
            for item in related {
                println!("{:.2}  {:>5}  {}", item.score, item.id, item.title);
            }
        }
        Commands::Tags => {
            let tags = TagStore::new(pool).all_tags().await?;
            for tag in tags {
                println!("{:>4}  {}", tag.usage_count, tag.name);
            }
        }
        Commands::Stats => {
            let stats = hub.store().stats().await?;
            println!("Total items: {}", stats.total_items);
            println!("\nBy type:");
            for (content_type, count) in &stats.by_type {
                println!("  {:<12} {}", content_type, count);
            }
            println!("\nLast 30 days:");
            for (day, count) in &stats.by_day {
                println!("  {}  {}", day, count);
            }
            println!("\nTop tags:");
            for tag in &stats.top_tags {
                println!("  {:<20} {}", tag.name, tag.usage_count);
            }
        }
        Commands::Delete { id } => {
            hub.store().delete(id).await?;
            println!("Deleted item {}.", id);
        }
        Commands::PrefSet { key, value } => {
            lore_db::PreferenceStore::new(pool).set(&key, &value).await?;
            println!("Set {}.", key);
        }
        Commands::PrefGet { key } => {
            match lore_db::PreferenceStore::new(pool).get(&key).await? {
                Some(pref) => println!("{}", pref.value),
                None => println!("(unset)"),
            }
        }
    }

    Ok(())
}

/// Run the pipeline with stage progress printed to stdout.
async fn cmd_process(hub: &Hub, locator: &Locator, context: Option<String>) -> Result<()> {
    let mut events = hub.events().subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                PipelineEvent::StageStarted { stage } => println!("-> {}", stage),
                PipelineEvent::Failed { stage, error } => {
                    println!("!! {} failed: {}", stage, error)
                }
                _ => {}
            }
        }
    });

    let result = hub.process(locator, context).await;
    printer.abort();

    let processed = result?;
    println!("\nSaved: {}", processed.note_path.display());
    println!("Id:    {}", processed.content_id);
    println!("Title: {}", processed.title);
    if !processed.tags.is_empty() {
        println!("Tags:  {}", processed.tags.join(", "));
    }
    Ok(())
}

fn parse_mode(mode: &str) -> Result<SearchMode> {
    match mode.to_lowercase().as_str() {
        "title" => Ok(SearchMode::Title),
        "tags" => Ok(SearchMode::Tags),
        "summary" => Ok(SearchMode::Summary),
        "all" => Ok(SearchMode::All),
        other => Err(Error::validation(
            format!(
                "Unknown search mode '{}', expected title, tags, summary or all",
                other
            ),
            "mode",
        )),
    }
}

fn default_config_path() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".lorevault.json"))
        .unwrap_or_else(|_| PathBuf::from(".lorevault.json"))
}
