//! Wire types for the subset of the Bot API doorman uses.

use doorman_core::CallbackAction;
use serde::{Deserialize, Serialize};

/// One inline keyboard button bound to a coordinator callback action.
#[derive(Debug, Clone)]
pub struct InlineButton {
    pub text: String,
    pub action: CallbackAction,
}

impl InlineButton {
    #[must_use]
    pub fn new(text: &str, action: CallbackAction) -> Self {
        Self { text: text.to_owned(), action }
    }
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageRef {
    pub message_id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMember {
    pub status: ChatMemberStatus,
}

/// Membership status as reported by `getChatMember`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl ChatMemberStatus {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Creator | Self::Administrator)
    }

    #[must_use]
    pub const fn has_left(self) -> bool {
        matches!(self, Self::Left | Self::Kicked)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplyMarkup {
    pub inline_keyboard: Vec<Vec<KeyboardButton>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct KeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl ReplyMarkup {
    pub(crate) fn from_rows(rows: &[Vec<InlineButton>]) -> Self {
        Self {
            inline_keyboard: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| KeyboardButton {
                            text: b.text.clone(),
                            callback_data: b.action.as_str().to_owned(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}
