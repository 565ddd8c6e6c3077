//! Block scanner
//!
//! Walks one block's transactions, fetches receipts only for transactions
//! that reference the target factory, and collects the parsed detections.

use crate::error::NetworkError;
use crate::parser::{self, calldata_targets};
use crate::rpc::ChainClient;
use crate::types::{BlockHandle, Detection};
use tracing::{debug, info, warn};

/// Scans blocks for deployments made through a single target contract.
pub struct BlockScanner<C> {
    client: C,
    target: String,
}

impl<C: ChainClient> BlockScanner<C> {
    /// Create a new scanner for the given factory address.
    pub fn new(client: C, target: impl Into<String>) -> Self {
        Self {
            client,
            target: target.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Scan one block.
    ///
    /// Fails only if the block's transaction list cannot be fetched. A
    /// transaction whose receipt is unavailable, or an event whose payload
    /// is malformed, is logged and skipped. Detections come back in
    /// transaction order, then event order.
    pub async fn scan(&self, block: &BlockHandle) -> Result<Vec<Detection>, NetworkError> {
        let transactions = self.client.block_transactions(block).await?;
        debug!("Block {} has {} transactions", block, transactions.len());

        let mut detections = Vec::new();

        for tx in &transactions {
            // Skip anything that never mentions the factory; saves a receipt round-trip
            if tx.calldata.is_empty() || !calldata_targets(tx, &self.target) {
                continue;
            }

            info!("Found factory call in TX {} (block {})", tx.hash, block);

            let receipt = match self.client.transaction_receipt(&tx.hash).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    warn!("Skipping TX {}: receipt unavailable: {}", tx.hash, e);
                    continue;
                }
            };

            for result in parser::parse(block, tx, &receipt, &self.target) {
                match result {
                    Ok(detection) => detections.push(detection),
                    Err(e) => warn!("Skipping event in TX {}: {}", tx.hash, e),
                }
            }
        }

        Ok(detections)
    }
}
