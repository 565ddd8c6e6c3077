//! Scripted collaborators for unit tests.

use crate::error::NetworkError;
use crate::notify::{DeliveryReport, NotificationSink};
use crate::rpc::{ChainClient, METHOD_BLOCK_WITH_TXS, METHOD_LATEST_BLOCK, METHOD_RECEIPT};
use crate::telegram::{InlineKeyboardMarkup, Messenger};
use crate::types::{BlockHandle, Detection, Event, LatestBlock, Receipt, Transaction};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

pub const TARGET: &str = "0x1a46467a9246f45c8c340f1f155266a26a71c07bd55d36e8d1c7d0d438a2dbc";

/// A six-element deploy event with the given name felt and deployed address.
pub fn deploy_event(from: &str, name: &str, deployed: &str) -> Event {
    Event {
        from_address: from.to_string(),
        keys: vec![],
        data: vec![
            "0x1".to_string(),
            name.to_string(),
            "0x2".to_string(),
            "0x3".to_string(),
            "0x4".to_string(),
            deployed.to_string(),
        ],
    }
}

pub fn invoke(hash: &str, calldata: &[&str]) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        calldata: calldata.iter().map(|s| s.to_string()).collect(),
    }
}

/// Chain client answering from fixed tables.
///
/// Heads are consumed in order; `None` entries fail. Unknown blocks and
/// receipts fail as a node would.
#[derive(Default)]
pub struct ScriptedChain {
    heads: Mutex<VecDeque<Option<String>>>,
    blocks: HashMap<BlockHandle, Vec<Transaction>>,
    receipts: HashMap<String, Receipt>,
    block_calls: Mutex<Vec<BlockHandle>>,
    receipt_calls: Mutex<Vec<String>>,
}

impl ScriptedChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heads(self, heads: &[Option<&str>]) -> Self {
        *self.heads.lock().unwrap() = heads.iter().map(|h| h.map(str::to_string)).collect();
        self
    }

    pub fn with_block(mut self, block: &BlockHandle, txs: Vec<Transaction>) -> Self {
        self.blocks.insert(block.clone(), txs);
        self
    }

    pub fn with_receipt(mut self, tx_hash: &str, receipt: Receipt) -> Self {
        self.receipts.insert(tx_hash.to_string(), receipt);
        self
    }

    pub fn block_calls(&self) -> Vec<BlockHandle> {
        self.block_calls.lock().unwrap().clone()
    }

    pub fn receipt_calls(&self) -> Vec<String> {
        self.receipt_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for ScriptedChain {
    async fn latest_block(&self) -> Result<LatestBlock, NetworkError> {
        match self.heads.lock().unwrap().pop_front().flatten() {
            Some(hash) => Ok(LatestBlock {
                block_hash: BlockHandle::new(hash),
                block_number: None,
            }),
            None => Err(NetworkError::Status {
                method: METHOD_LATEST_BLOCK,
                status: 502,
            }),
        }
    }

    async fn block_transactions(
        &self,
        block: &BlockHandle,
    ) -> Result<Vec<Transaction>, NetworkError> {
        self.block_calls.lock().unwrap().push(block.clone());
        self.blocks.get(block).cloned().ok_or(NetworkError::Rpc {
            method: METHOD_BLOCK_WITH_TXS,
            message: "Block not found".to_string(),
        })
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Receipt, NetworkError> {
        self.receipt_calls.lock().unwrap().push(tx_hash.to_string());
        self.receipts.get(tx_hash).cloned().ok_or(NetworkError::Timeout {
            method: METHOD_RECEIPT,
        })
    }
}

/// Sink that remembers every detection it was handed.
#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Detection>>,
}

impl RecordingSink {
    pub fn seen(&self) -> Vec<Detection> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, detection: &Detection) -> DeliveryReport {
        self.seen.lock().unwrap().push(detection.clone());
        DeliveryReport {
            delivered: 1,
            failed: 0,
        }
    }
}

/// One message as captured by `RecordingMessenger`.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

/// Messenger that records sends and fails for selected chats.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    failing: HashSet<i64>,
}

impl RecordingMessenger {
    pub fn failing_for(chat_ids: &[i64]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: chat_ids.iter().copied().collect(),
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.text)
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), NetworkError> {
        if self.failing.contains(&chat_id) {
            return Err(NetworkError::Rpc {
                method: "sendMessage",
                message: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }
}
