//! Starknet JSON-RPC types
//!
//! Type definitions for block heads, transactions, and receipts
//! returned from Starknet JSON-RPC endpoints, plus the detection record
//! produced from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque block identifier (the block hash as returned by the node).
///
/// Compared by equality only; no ordering is implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHandle(String);

impl BlockHandle {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Result of `starknet_blockHashAndNumber`. Only the hash is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestBlock {
    pub block_hash: BlockHandle,
    #[serde(default)]
    pub block_number: Option<u64>,
}

/// Result of `starknet_getBlockWithTxs`. Only the transaction list is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockWithTxs {
    pub transactions: Vec<Transaction>,
}

/// Starknet transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transaction {
    /// Transaction hash (felt hex string)
    #[serde(rename = "transaction_hash")]
    pub hash: String,

    /// Invocation arguments. Absent for deploy-account and declare
    /// transactions, which are treated as empty.
    #[serde(default)]
    pub calldata: Vec<String>,
}

/// Event emitted by a contract during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Event {
    /// Address of the emitting contract
    pub from_address: String,

    #[serde(default)]
    pub keys: Vec<String>,

    #[serde(default)]
    pub data: Vec<String>,
}

/// Transaction receipt. Only the events are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Receipt {
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One discovered token deployment, normalized for display and links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub block_hash: BlockHandle,
    /// Transaction hash in explorer-link form (see `parser::explorer_tx_hash`)
    pub tx_hash: String,
    pub token_name: Option<String>,
    /// Deployed token contract, zero-padded to 64 hex digits
    pub deployed_contract: String,
}
