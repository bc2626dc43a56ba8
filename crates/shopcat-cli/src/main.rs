mod db;
mod scrape;
mod store;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;
use crate::scrape::ScrapeArgs;

#[derive(Debug, Parser)]
#[command(name = "shopcat")]
#[command(about = "Storefront catalog scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a store's full catalog and persist it
    Scrape(ScrapeArgs),
    /// List stored product documents for a store
    List {
        /// Store URL the products were scraped from
        #[arg(long)]
        store_url: String,
        /// Maximum number of products to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Summarize the stored product documents
    Check,
    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = shopcat_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Scrape(args) => scrape::run_scrape(config, args).await,
        Commands::List { store_url, limit } => store::run_list(&config, &store_url, limit).await,
        Commands::Check => store::run_check(&config).await,
        Commands::Db { command } => db::run_db(&config, command).await,
    }
}

#[cfg(test)]
mod tests;
