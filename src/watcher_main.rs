//! Starknet memecoin watcher binary
//!
//! Polls the node for new blocks, alerts subscribers about tokens deployed
//! through the target factory, and serves the Telegram bot commands.

use anyhow::{Context, Result};
use clap::Parser;
use memewatch::bot::{run_updates, CommandHandler};
use memewatch::config::Config;
use memewatch::notify::TelegramNotifier;
use memewatch::poller::PollLoop;
use memewatch::rpc::StarknetRpc;
use memewatch::scanner::BlockScanner;
use memewatch::subscribers::SubscriberStore;
use memewatch::telegram::TelegramApi;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Starknet memecoin watcher
#[derive(Parser)]
#[command(name = "memewatch")]
#[command(about = "Alert Telegram subscribers about new factory token deployments")]
struct Args {
    /// Environment file to load before reading configuration
    #[arg(short, long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if let Some(path) = &args.env_file {
        dotenvy::from_path(path).with_context(|| format!("Failed to load {:?}", path))?;
    }

    info!("Starting Starknet memecoin monitor");
    let cfg = Config::from_env().context("Invalid configuration")?;
    info!("RPC URL: {}", cfg.chain.rpc_url);
    info!("Target contract: {}", cfg.chain.target_contract);
    info!("Subscribers file: {:?}", cfg.subscribers_file);

    let rpc = StarknetRpc::new(cfg.chain.rpc_url.clone(), cfg.chain.rpc_timeout)?;
    let scanner = Arc::new(BlockScanner::new(rpc, cfg.chain.target_contract.clone()));

    let subscribers = SubscriberStore::load(&cfg.subscribers_file)
        .await
        .context("Failed to load subscribers")?;

    let api = Arc::new(TelegramApi::new(&cfg.bot_token, cfg.chain.rpc_timeout)?);
    let notifier = Arc::new(TelegramNotifier::new(api.clone(), subscribers.clone()));
    let handler = CommandHandler::new(api.clone(), subscribers, scanner.clone(), notifier.clone());

    let mut poller = PollLoop::new(scanner, notifier, cfg.poll_interval);

    // Bot commands and block polling run side by side until Ctrl+C
    tokio::select! {
        _ = run_updates(api.as_ref(), &handler) => {}
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    info!("Watcher stopped");
    Ok(())
}
