use anyhow::Context;
use clap::Subcommand;
use tracing::info;

use crate::config;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create tables and seed lookups")]
    Init,

    #[command(about = "Drop every table; cannot be undone")]
    Wipe,
}

pub async fn handle(cmd: DbCommands) -> anyhow::Result<()> {
    let database = &config::config().database;
    let pool = DatabaseManager::connect(database)
        .await
        .context("failed to connect to database")?;

    match cmd {
        DbCommands::Init => {
            DatabaseManager::initialize(&pool, true).await?;
            info!("Schema ready");
        }
        DbCommands::Wipe => {
            DatabaseManager::wipe(&pool).await?;
            info!("All tables dropped");
        }
    }

    pool.close().await;
    Ok(())
}
