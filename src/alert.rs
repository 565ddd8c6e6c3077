//! Alert rendering
//!
//! Turns a detection into the message text and link buttons sent to
//! subscribers.

use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::types::Detection;

/// ETH on Starknet, used as the "sell" side of swap links.
const ETH_TOKEN: &str = "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";

/// Message body for a detection.
pub fn alert_text(detection: &Detection) -> String {
    let mut text = format!(
        "🚨 New Memecoin Detected! 🚨\n\n\
         Block Hash: {}\n\
         Transaction Hash: {}\n",
        detection.block_hash, detection.tx_hash
    );
    if let Some(name) = &detection.token_name {
        text.push_str(&format!("Token Name: {}\n", name));
    }
    text.push_str(&format!("Contract Address: {}\n", detection.deployed_contract));
    text
}

/// Chart, swap and explorer buttons for a detection.
pub fn alert_keyboard(detection: &Detection) -> InlineKeyboardMarkup {
    let token = &detection.deployed_contract;
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::link(
                "📈 DexScreener",
                format!("https://dexscreener.com/starknet/{}", token),
            )],
            vec![
                InlineKeyboardButton::link(
                    "💱 AVNU",
                    format!("https://app.avnu.fi/en?tokenFrom={}&tokenTo={}", ETH_TOKEN, token),
                ),
                InlineKeyboardButton::link(
                    "🌀 Ekubo",
                    format!(
                        "https://app.ekubo.org/?outputCurrency={}&inputCurrency=ETH",
                        token
                    ),
                ),
            ],
            vec![InlineKeyboardButton::link(
                "🔎 Transaction",
                format!("https://voyager.online/tx/{}", detection.tx_hash),
            )],
        ],
    }
}
