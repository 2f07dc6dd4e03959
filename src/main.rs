use clap::Parser;
use tracing_subscriber::EnvFilter;

use survey_exchange::cli::{self, Cli};

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL and JWT_SECRET are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("survey_exchange=info,tower_http=info")),
        )
        .init();

    if let Err(e) = cli::run(Cli::parse()).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
