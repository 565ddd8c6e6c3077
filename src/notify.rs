//! Detection fan-out
//!
//! `NotificationSink` is what the poll loop hands detections to.
//! `TelegramNotifier` delivers each one to every current subscriber.

use crate::alert::{alert_keyboard, alert_text};
use crate::subscribers::SubscriberStore;
use crate::telegram::Messenger;
use crate::types::Detection;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-detection delivery tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Receiver of detections. Delivery failures are handled inside the sink.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, detection: &Detection) -> DeliveryReport;
}

/// Sends alerts to all subscribers through a messenger.
pub struct TelegramNotifier<M> {
    messenger: Arc<M>,
    subscribers: SubscriberStore,
}

impl<M: Messenger> TelegramNotifier<M> {
    pub fn new(messenger: Arc<M>, subscribers: SubscriberStore) -> Self {
        Self {
            messenger,
            subscribers,
        }
    }
}

#[async_trait]
impl<M: Messenger> NotificationSink for TelegramNotifier<M> {
    async fn notify(&self, detection: &Detection) -> DeliveryReport {
        let text = alert_text(detection);
        let keyboard = alert_keyboard(detection);
        // Snapshot so the lock is not held across network sends
        let subscribers = self.subscribers.snapshot().await;

        let mut report = DeliveryReport::default();
        for chat_id in subscribers {
            match self
                .messenger
                .send_message(chat_id, &text, Some(&keyboard))
                .await
            {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Error sending alert to {}: {}", chat_id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Alert for {} delivered to {} subscribers ({} failed)",
            detection.deployed_contract, report.delivered, report.failed
        );
        report
    }
}
