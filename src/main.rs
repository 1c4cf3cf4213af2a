use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use defquill::config::Config;
use defquill::document::store::DocumentStore;
use defquill::file::loader::read_archive_file;
use defquill::format::{render_report, summarize};
use defquill::resolver::{InheritanceResolver, ItemLookup, LookupError};
use defquill::xpath::QueryEngine;

/// defquill - query game definition archives
#[derive(Parser)]
#[command(name = "defquill")]
#[command(version)]
#[command(about = "XPath queries and item reports over game definition archives", long_about = None)]
struct Cli {
    /// Zip archive of XML definitions (overrides the config file)
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Print item reports as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an XPath expression and summarize the matches
    Xpath {
        /// Expression; multiple words are joined with spaces
        #[arg(required = true)]
        expr: Vec<String>,
    },
    /// Show inherited stats and material properties for an item
    Iteminfo {
        /// Item defName or label; multiple words are joined with spaces
        #[arg(required = true)]
        name: Vec<String>,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load();
    init_tracing(&config);

    let archive = cli
        .archive
        .or_else(|| config.archive.clone())
        .context("No archive given; pass --archive or set `archive` in the config file")?;

    let store = DocumentStore::new();
    let bytes = read_archive_file(&archive)?;
    store
        .load(&bytes)
        .with_context(|| format!("Failed to load archive {}", archive.display()))?;
    let snapshot = store.snapshot();

    let engine = QueryEngine::new(&snapshot).with_traversal_limit(config.max_visited_nodes);

    match cli.command {
        Command::Xpath { expr } => {
            let expr = expr.join(" ");
            match engine.evaluate_timed(&expr) {
                Ok((matches, elapsed)) => {
                    println!("{}", summarize(&matches, elapsed, &config.summary_options()));
                }
                Err(err) => println!("Invalid XPath! Error: {}", err),
            }
        }
        Command::Iteminfo { name } => {
            let name = name.join(" ");
            let resolver = InheritanceResolver::new(&snapshot)
                .with_max_chain_depth(config.max_chain_depth)
                .with_engine(engine);
            let lookup = ItemLookup::new(resolver);

            match lookup.report(&name) {
                Ok(Some(report)) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Ok(Some(report)) => print!("{}", render_report(&report)),
                Ok(None) => println!("No results."),
                Err(err @ LookupError::InvalidName(_)) => println!("{}", err),
                Err(LookupError::Query(err)) => println!("Invalid XPath! Error: {}", err),
            }
        }
    }

    Ok(())
}
