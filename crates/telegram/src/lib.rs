//! Telegram Bot API actuator for doorman.
//!
//! Everything here is best-effort from the coordinator's point of view:
//! callers log failures and move on, they never retry a state transition
//! because a platform call failed.

mod client;
mod error;
mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use doorman_core::CallbackAction;

pub use client::BotClient;
pub use error::TelegramError;
pub use types::{ChatMemberStatus, InlineButton};

/// Boundary for user-visible platform effects.
#[async_trait]
pub trait ChatActuator: Send + Sync {
    /// Send an HTML message; returns the new message's ID.
    async fn send_message(&self, chat_id: i64, html: &str) -> Result<i64, TelegramError>;

    /// Send a photo with caption and inline keyboard; returns the message ID.
    async fn send_photo(
        &self,
        chat_id: i64,
        image: Vec<u8>,
        caption: &str,
        keyboard: &[Vec<InlineButton>],
    ) -> Result<i64, TelegramError>;

    /// Edit a photo message's caption in place.
    async fn edit_caption(
        &self,
        chat_id: i64,
        message_id: i64,
        caption: &str,
        keyboard: &[Vec<InlineButton>],
    ) -> Result<(), TelegramError>;

    /// Replace a photo message's image and caption in place.
    async fn edit_photo(
        &self,
        chat_id: i64,
        message_id: i64,
        image: Vec<u8>,
        caption: &str,
        keyboard: &[Vec<InlineButton>],
    ) -> Result<(), TelegramError>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError>;

    /// Remove a member until the given time, after which the platform
    /// allows rejoining.
    async fn ban_member(
        &self,
        chat_id: i64,
        user_id: i64,
        until: DateTime<Utc>,
    ) -> Result<(), TelegramError>;

    /// Whether the user is an administrator or the owner of the chat.
    async fn is_admin(&self, chat_id: i64, user_id: i64) -> Result<bool, TelegramError>;

    /// Whether the user has already left (or was removed from) the chat.
    async fn has_left(&self, chat_id: i64, user_id: i64) -> Result<bool, TelegramError>;

    /// Acknowledge an inline keyboard press with a toast.
    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), TelegramError>;
}

/// Inline keyboard layout shown under every challenge message.
#[must_use]
pub fn challenge_keyboard() -> Vec<Vec<InlineButton>> {
    vec![
        vec![
            InlineButton::new("Refresh captcha", CallbackAction::Refresh),
            InlineButton::new("Approve [admin]", CallbackAction::PassThrough),
        ],
        vec![InlineButton::new("Kick [admin]", CallbackAction::Kick)],
    ]
}
