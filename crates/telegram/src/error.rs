//! Typed error enum for the Telegram actuator.

use thiserror::Error;

/// Errors from Telegram Bot API calls.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
    #[error("Telegram API answered ok without a result payload")]
    MissingResult,
}

impl TelegramError {
    /// Whether this error is transient and a retry may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::Api { code, .. } => matches!(code, 429 | 500 | 502 | 503),
            Self::MissingResult => false,
        }
    }
}
