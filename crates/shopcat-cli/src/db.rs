//! Database management command handlers.

use clap::Subcommand;
use shopcat_core::AppConfig;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Verify the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

pub(crate) async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = shopcat_db::connect_pool_from_config(config).await?;

    match command {
        DbCommands::Ping => {
            shopcat_db::ping(&pool).await?;
            println!("database connection ok");
        }
        DbCommands::Migrate => {
            let applied = shopcat_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }

    Ok(())
}
