use anyhow::Result;
use clap::Parser;

use portal_client::cli::{run_command, Cli};
use portal_client::logger;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logger::init_logging(cli.log_level.as_deref());

    tracing::debug!(api_url = %cli.api_url, "Starting portal client");
    run_command(&cli).await
}
