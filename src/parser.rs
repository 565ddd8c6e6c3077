//! Deploy event parser
//!
//! Decides whether a transaction deployed a token through the target
//! factory and turns each qualifying event into a `Detection`.
//! Pure functions, no I/O.

use crate::error::DataShapeError;
use crate::types::{BlockHandle, Detection, Receipt, Transaction};

/// Minimum number of data elements in a factory deploy event.
pub const MIN_EVENT_DATA_LEN: usize = 6;

/// Index of the token name felt within the event data.
const TOKEN_NAME_INDEX: usize = 1;

/// Width of a normalized address, in hex digits after `0x`.
const ADDRESS_HEX_WIDTH: usize = 64;

/// Check whether the target address appears as an element of the calldata.
pub fn calldata_targets(tx: &Transaction, target: &str) -> bool {
    tx.calldata.iter().any(|arg| arg == target)
}

/// Left-zero-pad a `0x` address to 64 hex digits.
///
/// Values without the prefix, or already at least 64 digits wide, are
/// returned unchanged.
pub fn normalize_address(addr: &str) -> String {
    match addr.strip_prefix("0x") {
        Some(rest) => format!("0x{:0>width$}", rest, width = ADDRESS_HEX_WIDTH),
        None => addr.to_string(),
    }
}

/// Rewrite a transaction hash into the form used by explorer links.
///
/// A leading `0x` becomes `0x00`; any other value passes through.
pub fn explorer_tx_hash(hash: &str) -> String {
    match hash.strip_prefix("0x") {
        Some(rest) => format!("0x00{}", rest),
        None => hash.to_string(),
    }
}

/// Pad an odd-length hex string with a leading zero.
fn pad_hex_string(s: &str) -> String {
    if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    }
}

/// Decode a short-string felt into text.
///
/// Returns `Ok(None)` when the decoded text is empty after trimming.
pub fn decode_token_name(felt: &str) -> Result<Option<String>, DataShapeError> {
    let digits = felt.strip_prefix("0x").unwrap_or(felt);
    let bytes = hex::decode(pad_hex_string(digits)).map_err(|e| DataShapeError::InvalidHex {
        value: felt.to_string(),
        reason: e.to_string(),
    })?;
    let text = String::from_utf8(bytes).map_err(|_| DataShapeError::InvalidUtf8 {
        value: felt.to_string(),
    })?;

    let name = text.trim();
    if name.is_empty() {
        Ok(None)
    } else {
        Ok(Some(name.to_string()))
    }
}

/// Parse one transaction and its receipt into detections.
///
/// Yields one entry per qualifying event, in event order. An entry is an
/// error when that event's payload is malformed; other events are unaffected.
pub fn parse(
    block: &BlockHandle,
    tx: &Transaction,
    receipt: &Receipt,
    target: &str,
) -> Vec<Result<Detection, DataShapeError>> {
    if !calldata_targets(tx, target) {
        return Vec::new();
    }

    receipt
        .events
        .iter()
        .filter(|event| event.from_address == target && event.data.len() >= MIN_EVENT_DATA_LEN)
        .map(|event| -> Result<Detection, DataShapeError> {
            let token_name = decode_token_name(&event.data[TOKEN_NAME_INDEX])?;
            // len >= MIN_EVENT_DATA_LEN, so last() is always present
            let deployed = event.data.last().map(String::as_str).unwrap_or_default();

            Ok(Detection {
                block_hash: block.clone(),
                tx_hash: explorer_tx_hash(&tx.hash),
                token_name,
                deployed_contract: normalize_address(deployed),
            })
        })
        .collect()
}
