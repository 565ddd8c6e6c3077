//! Telegram Bot API client
//!
//! Minimal `getUpdates` long polling and `sendMessage` with inline link
//! buttons. Failures are reported as `NetworkError`, the same as node
//! failures.

use crate::error::NetworkError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://api.telegram.org";

/// Seconds the server holds a `getUpdates` request open.
pub const LONG_POLL_SECS: u64 = 30;

/// Outbound message delivery.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), NetworkError>;
}

/// Inline keyboard attached below a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// A button that opens a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub url: String,
}

impl InlineKeyboardButton {
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Incoming update. Only message updates are of interest.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Bot API client bound to one bot token.
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    /// Create a client. `timeout` bounds ordinary calls; long polls get
    /// `LONG_POLL_SECS` on top of it.
    pub fn new(token: &str, timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout + Duration::from_secs(LONG_POLL_SECS))
            .build()
            .map_err(|e| NetworkError::from_reqwest("client", e))?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", API_BASE, token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: Value,
    ) -> Result<T, NetworkError> {
        debug!("Bot API {}", method);

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(&body)
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(method, e))?;

        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| NetworkError::from_reqwest(method, e))?;

        into_result(method, status, envelope)
    }

    /// Fetch updates after `offset`, waiting up to `LONG_POLL_SECS`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, NetworkError> {
        let body = json!({
            "offset": offset,
            "timeout": LONG_POLL_SECS,
            "allowed_updates": ["message"]
        });
        self.call("getUpdates", body).await
    }
}

fn into_result<T>(
    method: &'static str,
    status: StatusCode,
    envelope: ApiResponse<T>,
) -> Result<T, NetworkError> {
    if !envelope.ok {
        return Err(NetworkError::Rpc {
            method,
            message: envelope
                .description
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        });
    }
    if status != StatusCode::OK {
        return Err(NetworkError::Status {
            method,
            status: status.as_u16(),
        });
    }
    envelope
        .result
        .ok_or_else(|| NetworkError::malformed(method, "missing 'result' field"))
}

/// Build a `sendMessage` request body.
fn send_message_body(chat_id: i64, text: &str, keyboard: Option<&InlineKeyboardMarkup>) -> Value {
    let mut body = json!({
        "chat_id": chat_id,
        "text": text,
        "disable_web_page_preview": true
    });
    if let Some(keyboard) = keyboard {
        body["reply_markup"] = json!(keyboard);
    }
    body
}

#[async_trait]
impl Messenger for TelegramApi {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), NetworkError> {
        let _sent: Value = self
            .call("sendMessage", send_message_body(chat_id, text, keyboard))
            .await?;
        Ok(())
    }
}
