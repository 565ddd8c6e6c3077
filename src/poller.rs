//! Main poll loop
//!
//! Polls the chain head on a fixed delay, scans each new block once,
//! and forwards detections to the notification sink.

use crate::error::NetworkError;
use crate::notify::NotificationSink;
use crate::rpc::ChainClient;
use crate::scanner::BlockScanner;
use crate::types::{BlockHandle, Detection};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Poll interval when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Scan a block and hand every detection to the sink.
///
/// Shared by the poll loop and the manual `check` command.
pub async fn scan_and_notify<C, N>(
    scanner: &BlockScanner<C>,
    sink: &N,
    block: &BlockHandle,
) -> Result<Vec<Detection>, NetworkError>
where
    C: ChainClient,
    N: NotificationSink + ?Sized,
{
    let detections = scanner.scan(block).await?;

    for detection in &detections {
        info!(
            "🚨 New memecoin detected: block={} tx={} name={} contract={}",
            detection.block_hash,
            detection.tx_hash,
            detection.token_name.as_deref().unwrap_or("-"),
            detection.deployed_contract
        );
        sink.notify(detection).await;
    }

    Ok(detections)
}

/// Where the loop is between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Scanning,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The head query failed; nothing else happened.
    HeadUnavailable,
    /// The head is the block already processed.
    Unchanged(BlockHandle),
    /// A new block was scanned.
    Scanned {
        block: BlockHandle,
        detections: usize,
    },
    /// A new block was seen but its transactions could not be fetched.
    ScanFailed(BlockHandle),
}

/// Fixed-delay poller over one scanner and one sink.
pub struct PollLoop<C, N> {
    scanner: Arc<BlockScanner<C>>,
    sink: Arc<N>,
    interval: Duration,
    state: PollState,
    last_processed: Option<BlockHandle>,
}

impl<C: ChainClient, N: NotificationSink> PollLoop<C, N> {
    /// Create a new poll loop.
    pub fn new(scanner: Arc<BlockScanner<C>>, sink: Arc<N>, interval: Duration) -> Self {
        Self {
            scanner,
            sink,
            interval,
            state: PollState::Idle,
            last_processed: None,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn last_processed(&self) -> Option<&BlockHandle> {
        self.last_processed.as_ref()
    }

    /// Run one poll iteration. Never fails; every error is logged.
    pub async fn tick(&mut self) -> TickOutcome {
        let latest = match self.scanner.client().latest_block().await {
            Ok(latest) => latest,
            Err(e) => {
                warn!("Failed to get latest block: {}", e);
                return TickOutcome::HeadUnavailable;
            }
        };

        let block = latest.block_hash;
        if self.last_processed.as_ref() == Some(&block) {
            return TickOutcome::Unchanged(block);
        }

        match latest.block_number {
            Some(number) => info!("Checking block {} ({})", number, block),
            None => info!("Checking block {}", block),
        }
        self.state = PollState::Scanning;

        let outcome =
            match scan_and_notify(self.scanner.as_ref(), self.sink.as_ref(), &block).await {
                Ok(detections) => {
                    info!("Completed block {} → {} detections", block, detections.len());
                    TickOutcome::Scanned {
                        block: block.clone(),
                        detections: detections.len(),
                    }
                }
                Err(e) => {
                    warn!("Failed to scan block {}: {}", block, e);
                    TickOutcome::ScanFailed(block.clone())
                }
            };

        // A block is attempted once, whatever the scan produced
        self.last_processed = Some(block);
        self.state = PollState::Idle;
        outcome
    }

    /// Run the main poll loop.
    ///
    /// Never returns; the sleep starts after each tick finishes.
    pub async fn run(&mut self) {
        info!(
            "Starting poll loop (interval {:?}, target {})",
            self.interval,
            self.scanner.target()
        );

        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
