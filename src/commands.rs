//! Chat commands
//!
//! Text → `Command` parsing and the fixed reply strings.

use crate::error::UsageError;
use crate::types::BlockHandle;

pub const START_REPLY: &str = "Welcome! Use /subscribe command to subscribe to memecoin monitoring bot.\n\
     Use /unsubscribe command to stop receiving alerts.\n\
     Use /check <block_hash> command to check a specific block.";
pub const SUBSCRIBED_REPLY: &str = "Successfully subscribed!";
pub const ALREADY_SUBSCRIBED_REPLY: &str = "You are already subscribed!";
pub const UNSUBSCRIBED_REPLY: &str = "Successfully unsubscribed!";
pub const NOT_SUBSCRIBED_REPLY: &str = "You are not subscribed!";
pub const CHECK_DONE_REPLY: &str = "Check completed!";

/// A recognized bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Subscribe,
    Unsubscribe,
    Check(BlockHandle),
}

impl Command {
    /// Parse a message text.
    ///
    /// Returns `Ok(None)` for plain text and unknown commands. Accepts the
    /// `/command@BotName` form used in group chats.
    pub fn parse(text: &str) -> Result<Option<Self>, UsageError> {
        let mut words = text.split_whitespace();
        let Some(head) = words.next().and_then(|w| w.strip_prefix('/')) else {
            return Ok(None);
        };
        let name = head.split('@').next().unwrap_or(head);
        let args: Vec<&str> = words.collect();

        let command = match name {
            "start" => Self::Start,
            "subscribe" => Self::Subscribe,
            "unsubscribe" => Self::Unsubscribe,
            "check" => match args.as_slice() {
                [hash] => Self::Check(BlockHandle::from(*hash)),
                _ => return Err(UsageError::CheckArguments),
            },
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

pub fn checking_reply(block: &BlockHandle) -> String {
    format!("Checking block hash: {}", block)
}

pub fn error_reply(err: &dyn std::fmt::Display) -> String {
    format!("Error occurred: {}", err)
}
