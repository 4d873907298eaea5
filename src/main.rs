use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use price_service::generator::DEFAULT_COUNT;
use price_service::service::STATUS_OK;
use price_service::{build_service, generate_feed, init_tracing, RunMode, StoreArgs};

#[derive(Parser, Debug)]
#[command(version, about = "Import price feeds and browse stored prices")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download a feed and upsert its prices
    Import {
        /// Absolute URL of a `name;price` feed
        #[arg(long)]
        url: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print one page of stored prices as JSON
    List {
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        skip: i64,

        #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
        limit: i64,

        /// name, price, changes or updatedAt
        #[arg(long, default_value = "name")]
        order_by: String,

        /// ascending or descending
        #[arg(long, default_value = "ascending")]
        order_direction: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Write a random feed, to stdout or a file
    Generate {
        #[arg(long, default_value_t = DEFAULT_COUNT)]
        count: usize,

        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Import { url, store } => run_import(&url, &store),
        Command::List {
            skip,
            limit,
            order_by,
            order_direction,
            store,
        } => run_list(skip, limit, &order_by, &order_direction, &store),
        Command::Generate { count, output } => run_generate(count, output),
    }
}

fn run_import(url: &str, store: &StoreArgs) -> Result<()> {
    init_tracing(store.mode);

    let service = build_service(store)
        .with_context(|| format!("Failed to open database {}", store.db.display()))?;

    let reply = service.fetch_and_import(url);
    if reply.status != STATUS_OK {
        bail!("Import failed: {}", reply.message);
    }

    let total = service.store().count().context("Failed to count prices")?;
    println!("✓ Imported {} into {} ({} prices stored)", url, store.db.display(), total);

    Ok(())
}

fn run_list(
    skip: i64,
    limit: i64,
    order_by: &str,
    order_direction: &str,
    store: &StoreArgs,
) -> Result<()> {
    init_tracing(store.mode);

    let service = build_service(store)
        .with_context(|| format!("Failed to open database {}", store.db.display()))?;

    let reply = service.list_prices(skip, limit, order_by, order_direction);
    if reply.status != STATUS_OK {
        bail!("List failed: {}", reply.message);
    }

    println!("{}", serde_json::to_string_pretty(&reply)?);

    Ok(())
}

fn run_generate(count: usize, output: Option<PathBuf>) -> Result<()> {
    init_tracing(RunMode::Dev);

    let feed = generate_feed(&mut rand::thread_rng(), count);

    match output {
        Some(path) => {
            fs::write(&path, feed)
                .with_context(|| format!("Failed to write feed to {}", path.display()))?;
            tracing::info!(rows = count, path = %path.display(), "feed generated");
        }
        None => print!("{}", feed),
    }

    Ok(())
}
