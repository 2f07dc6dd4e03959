pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "survey-exchange")]
#[command(about = "Survey Exchange - publish surveys, answer them for points, redeem rewards")]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Override the configured port")]
        port: Option<u16>,
    },

    #[command(about = "Database maintenance")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Db { cmd } => commands::db::handle(cmd).await,
    }
}
