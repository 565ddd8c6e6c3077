//! Telegram command surface
//!
//! Long-polls the Bot API for messages and dispatches commands. Runs as
//! its own task beside the poll loop and shares the subscriber store with
//! the notifier.

use crate::commands::{
    checking_reply, error_reply, Command, ALREADY_SUBSCRIBED_REPLY, CHECK_DONE_REPLY,
    NOT_SUBSCRIBED_REPLY, START_REPLY, SUBSCRIBED_REPLY, UNSUBSCRIBED_REPLY,
};
use crate::notify::NotificationSink;
use crate::poller::scan_and_notify;
use crate::rpc::ChainClient;
use crate::scanner::BlockScanner;
use crate::subscribers::{SubscribeOutcome, SubscriberStore, UnsubscribeOutcome};
use crate::telegram::{Message, Messenger, TelegramApi};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Pause after a failed `getUpdates` before trying again.
const UPDATE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Executes chat commands and replies to the invoking chat.
pub struct CommandHandler<C, M, N> {
    messenger: Arc<M>,
    subscribers: SubscriberStore,
    scanner: Arc<BlockScanner<C>>,
    sink: Arc<N>,
}

impl<C, M, N> CommandHandler<C, M, N>
where
    C: ChainClient,
    M: Messenger,
    N: NotificationSink,
{
    pub fn new(
        messenger: Arc<M>,
        subscribers: SubscriberStore,
        scanner: Arc<BlockScanner<C>>,
        sink: Arc<N>,
    ) -> Self {
        Self {
            messenger,
            subscribers,
            scanner,
            sink,
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.messenger.send_message(chat_id, text, None).await {
            warn!("Failed to reply to {}: {}", chat_id, e);
        }
    }

    /// Handle one incoming message. Non-command text is ignored.
    pub async fn handle_message(&self, message: &Message) {
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let chat_id = message.chat.id;

        match Command::parse(text) {
            Ok(Some(command)) => {
                // Subscriptions are per user; fall back to the chat for channel posts
                let user_id = message.from.as_ref().map_or(chat_id, |u| u.id);
                self.execute(chat_id, user_id, command).await;
            }
            Ok(None) => {}
            Err(usage) => self.reply(chat_id, &usage.to_string()).await,
        }
    }

    /// Run a parsed command on behalf of `user_id`, replying in `chat_id`.
    pub async fn execute(&self, chat_id: i64, user_id: i64, command: Command) {
        info!("Command {:?} from user {}", command, user_id);

        match command {
            Command::Start => self.reply(chat_id, START_REPLY).await,

            Command::Subscribe => {
                let reply = match self.subscribers.subscribe(user_id).await {
                    Ok(SubscribeOutcome::Added) => SUBSCRIBED_REPLY.to_string(),
                    Ok(SubscribeOutcome::AlreadySubscribed) => ALREADY_SUBSCRIBED_REPLY.to_string(),
                    Err(e) => {
                        warn!("Subscribe failed for {}: {}", user_id, e);
                        error_reply(&e)
                    }
                };
                self.reply(chat_id, &reply).await;
            }

            Command::Unsubscribe => {
                let reply = match self.subscribers.unsubscribe(user_id).await {
                    Ok(UnsubscribeOutcome::Removed) => UNSUBSCRIBED_REPLY.to_string(),
                    Ok(UnsubscribeOutcome::NotSubscribed) => NOT_SUBSCRIBED_REPLY.to_string(),
                    Err(e) => {
                        warn!("Unsubscribe failed for {}: {}", user_id, e);
                        error_reply(&e)
                    }
                };
                self.reply(chat_id, &reply).await;
            }

            Command::Check(block) => {
                self.reply(chat_id, &checking_reply(&block)).await;
                let reply =
                    match scan_and_notify(self.scanner.as_ref(), self.sink.as_ref(), &block).await
                    {
                        Ok(_) => CHECK_DONE_REPLY.to_string(),
                        Err(e) => error_reply(&e),
                    };
                self.reply(chat_id, &reply).await;
            }
        }
    }
}

/// Long-poll the Bot API forever, handling messages in arrival order.
pub async fn run_updates<C, N>(api: &TelegramApi, handler: &CommandHandler<C, TelegramApi, N>)
where
    C: ChainClient,
    N: NotificationSink,
{
    info!("Listening for bot commands");
    let mut offset = 0;

    loop {
        let updates = match api.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Failed to fetch bot updates: {}", e);
                tokio::time::sleep(UPDATE_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Some(message) = &update.message {
                handler.handle_message(message).await;
            }
        }
    }
}
