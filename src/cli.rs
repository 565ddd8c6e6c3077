//! CLI implementation for scanctl
//!
//! One-shot queries against the configured node and the subscriber file.
//! All commands output pretty JSON; nothing is sent to subscribers.

use crate::config::ChainConfig;
use crate::rpc::{ChainClient, StarknetRpc};
use crate::scanner::BlockScanner;
use crate::subscribers::read_ids;
use crate::types::BlockHandle;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

/// Starknet deploy scanner CLI tool
#[derive(Parser)]
#[command(name = "scanctl")]
#[command(about = "Inspect Starknet blocks for factory token deployments")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current head block
    Latest,
    /// Scan one block and print its detections
    Check {
        /// Block hash (hex, with 0x prefix)
        block_hash: String,
    },
    /// Print the persisted subscriber list
    Subscribers {
        /// Path to the subscriber file
        #[arg(short, long, default_value = "subscribers.json")]
        file: PathBuf,
    },
}

fn scanner() -> Result<BlockScanner<StarknetRpc>> {
    let cfg = ChainConfig::from_env().context("Failed to load chain configuration")?;
    let rpc = StarknetRpc::new(cfg.rpc_url, cfg.rpc_timeout)?;
    Ok(BlockScanner::new(rpc, cfg.target_contract))
}

/// Run the CLI with the given arguments.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Latest => {
            let scanner = scanner()?;
            let latest = scanner
                .client()
                .latest_block()
                .await
                .context("Failed to get latest block")?;
            println!("{}", serde_json::to_string_pretty(&latest)?);
        }
        Commands::Check { block_hash } => {
            let scanner = scanner()?;
            let block = BlockHandle::new(block_hash);
            let detections = scanner
                .scan(&block)
                .await
                .with_context(|| format!("Failed to scan block {}", block))?;
            let output = json!({
                "block_hash": block,
                "target_contract": scanner.target(),
                "detections": detections,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Subscribers { file } => {
            let ids = read_ids(&file)
                .await
                .with_context(|| format!("Failed to read {:?}", file))?;
            let output = json!({
                "file": file,
                "count": ids.len(),
                "subscribers": ids,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
