//! memewatch - Starknet factory deployment watcher
//!
//! This library polls a Starknet node for new blocks, detects tokens
//! deployed through a single factory contract, and delivers alerts to
//! Telegram subscribers.

pub mod error;
pub mod types;

// Chain side
pub mod parser;
pub mod poller;
pub mod rpc;
pub mod scanner;

// Bot side
pub mod alert;
pub mod bot;
pub mod commands;
pub mod notify;
pub mod subscribers;
pub mod telegram;

pub mod cli;
pub mod config;

#[cfg(test)]
mod mock;

// Re-export the main types for convenience
pub use error::{ConfigError, DataShapeError, NetworkError, StoreError, UsageError};
pub use rpc::{ChainClient, StarknetRpc};
pub use scanner::BlockScanner;
pub use types::{BlockHandle, Detection, Event, LatestBlock, Receipt, Transaction};
