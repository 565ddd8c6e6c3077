//! Error types
//!
//! One enum per failure class. Network and data-shape errors are always
//! recoverable; configuration errors are fatal at startup.

use std::path::PathBuf;
use thiserror::Error;

/// Transport, status or decoding failure talking to the node or the Bot API.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("{method}: request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method}: request timed out")]
    Timeout { method: &'static str },

    #[error("{method}: HTTP {status}")]
    Status { method: &'static str, status: u16 },

    #[error("{method}: RPC error: {message}")]
    Rpc {
        method: &'static str,
        message: String,
    },

    #[error("{method}: malformed response: {reason}")]
    Malformed {
        method: &'static str,
        reason: String,
    },
}

impl NetworkError {
    /// Classify a reqwest failure, splitting out timeouts.
    pub fn from_reqwest(method: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { method }
        } else {
            Self::Transport { method, source }
        }
    }

    pub fn malformed(method: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            method,
            reason: reason.into(),
        }
    }
}

/// An event payload that does not have the expected shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataShapeError {
    #[error("token name {value:?} is not valid hex: {reason}")]
    InvalidHex { value: String, reason: String },

    #[error("token name {value:?} is not valid UTF-8")]
    InvalidUtf8 { value: String },
}

/// Bad arguments to a chat command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Please enter a block hash.\nExample: /check <block_hash>")]
    CheckArguments,
}

/// Missing or invalid startup configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Subscriber file could not be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("subscriber file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("subscriber file {path:?} is not a JSON array of ids: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
