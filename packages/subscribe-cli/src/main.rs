//! Terminal front end: search a creator by name, then assign the creator's
//! subscription to groups.
//!
//! ## Running
//!
//! ```bash
//! SUBSCRIBE_API_URL=http://localhost:8000/api cargo run -p subscribe-cli -- alice
//! ```

mod config;
mod context;
mod render;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use subscribe_client::SubscribeClient;
use subscribe_flow::{SearchWorkflow, SubscribeController};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::context::AppContext;

#[derive(Parser, Debug)]
#[command(name = "subscribe", about = "Search creators and assign their subscription groups")]
struct Cli {
    /// API base URL (overrides SUBSCRIBE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Creator name to search for right away
    name: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they don't interleave with the prompts
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,subscribe_flow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env(cli.api_url).context("Failed to load configuration")?;
    tracing::info!(api_url = %config.api_url, page_size = config.group_page_size, "Starting");

    let mut client = SubscribeClient::new(config.api_url.clone());
    if let Some(token) = &config.api_token {
        client = client.with_token(token.clone());
    }
    let controller = SubscribeController::with_workflow(
        client,
        SearchWorkflow::with_page_size(config.group_page_size),
    );

    let ctx = AppContext::new(config);
    runner::run(&ctx, &controller, cli.name).await
}
