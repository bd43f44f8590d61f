use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_DISPLAY_NAME_CHARS, SECONDS_PLACEHOLDER};

/// Durable record of an unresolved challenge for one (chat, user) pair.
///
/// Exists from the moment the challenge message is posted until the member
/// passes, leaves, is removed, or an admin resolves it. `expires_at` is the
/// authoritative deadline; queue delays are never trusted for elapsed time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingVerification {
    pub chat_id: i64,
    pub user_id: i64,
    /// Index of the expected answer in the challenge provider's word list.
    /// Replaced in place on refresh; the deadline and message stay put.
    pub challenge_secret: i32,
    /// Message displaying the challenge; edited in place on every tick and
    /// used for reverse lookup when an admin acts on the message.
    pub challenge_message_id: i64,
    pub expires_at: DateTime<Utc>,
    /// Pre-rendered HTML mention link, immutable for the record's lifetime.
    pub display_name: String,
    /// Caption template with a single `{seconds}` placeholder.
    pub prompt_template: String,
}

impl PendingVerification {
    /// Whole seconds until the deadline; negative once past it.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) <= 0
    }

    /// Renders the challenge caption for the given remaining time.
    #[must_use]
    pub fn caption(&self, remaining_secs: i64) -> String {
        render_caption(&self.display_name, &self.prompt_template, remaining_secs)
    }
}

/// Renders a challenge caption: mention link followed by the prompt with
/// the `{seconds}` placeholder substituted.
#[must_use]
pub fn render_caption(display_name: &str, template: &str, remaining_secs: i64) -> String {
    format!("{display_name} {}", template.replace(SECONDS_PLACEHOLDER, &remaining_secs.to_string()))
}

/// Builds the HTML mention link shown in challenge and success messages.
#[must_use]
pub fn mention_link(user_id: i64, first_name: &str, last_name: Option<&str>) -> String {
    let name = full_name(first_name, last_name);
    format!(r#"<a href="tg://user?id={user_id}">{}</a>"#, escape_html(&name))
}

/// Joins and truncates a member's name for display.
#[must_use]
pub fn full_name(first_name: &str, last_name: Option<&str>) -> String {
    let mut name = match last_name {
        Some(last) if !last.is_empty() => format!("{first_name} {last}"),
        _ => first_name.to_owned(),
    };
    name = name.trim().to_owned();
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        let truncated: String = name.chars().take(MAX_DISPLAY_NAME_CHARS).collect();
        name = format!("{truncated}...");
    }
    name
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
