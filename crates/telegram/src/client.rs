use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::TelegramError;
use crate::types::{ApiResponse, ChatMember, InlineButton, MessageRef, ReplyMarkup};
use crate::ChatActuator;

const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API client.
pub struct BotClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl std::fmt::Debug for BotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotClient")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BotClient {
    /// Creates a client against the public Bot API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: String) -> Result<Self, TelegramError> {
        Self::with_base_url(token, DEFAULT_API_URL.to_owned())
    }

    /// Creates a client against a custom API endpoint (tests, local API
    /// server).
    pub fn with_base_url(token: String, base_url: String) -> Result<Self, TelegramError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { client, token, base_url })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, TelegramError> {
        let response =
            self.client.post(self.method_url(method)).json(body).send().await?;
        Self::unwrap_response(response.json::<ApiResponse<T>>().await?)
    }

    async fn call_multipart<T: DeserializeOwned>(
        &self,
        method: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, TelegramError> {
        let response =
            self.client.post(self.method_url(method)).multipart(form).send().await?;
        Self::unwrap_response(response.json::<ApiResponse<T>>().await?)
    }

    fn unwrap_response<T>(envelope: ApiResponse<T>) -> Result<T, TelegramError> {
        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope.error_code.unwrap_or(0),
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope.result.ok_or(TelegramError::MissingResult)
    }

    fn markup_json(keyboard: &[Vec<InlineButton>]) -> serde_json::Value {
        serde_json::to_value(ReplyMarkup::from_rows(keyboard)).unwrap_or_default()
    }

    fn photo_part(image: Vec<u8>) -> reqwest::multipart::Part {
        reqwest::multipart::Part::bytes(image).file_name("captcha.png")
    }
}

#[async_trait]
impl ChatActuator for BotClient {
    async fn send_message(&self, chat_id: i64, html: &str) -> Result<i64, TelegramError> {
        let msg: MessageRef = self
            .call(
                "sendMessage",
                &serde_json::json!({
                    "chat_id": chat_id,
                    "text": html,
                    "parse_mode": "HTML",
                }),
            )
            .await?;
        Ok(msg.message_id)
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image: Vec<u8>,
        caption: &str,
        keyboard: &[Vec<InlineButton>],
    ) -> Result<i64, TelegramError> {
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_owned())
            .text("parse_mode", "HTML")
            .text("reply_markup", Self::markup_json(keyboard).to_string())
            .part("photo", Self::photo_part(image));
        let msg: MessageRef = self.call_multipart("sendPhoto", form).await?;
        Ok(msg.message_id)
    }

    async fn edit_caption(
        &self,
        chat_id: i64,
        message_id: i64,
        caption: &str,
        keyboard: &[Vec<InlineButton>],
    ) -> Result<(), TelegramError> {
        // Telegram returns the edited Message object; only success matters.
        let _: serde_json::Value = self
            .call(
                "editMessageCaption",
                &serde_json::json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "caption": caption,
                    "parse_mode": "HTML",
                    "reply_markup": Self::markup_json(keyboard),
                }),
            )
            .await?;
        Ok(())
    }

    async fn edit_photo(
        &self,
        chat_id: i64,
        message_id: i64,
        image: Vec<u8>,
        caption: &str,
        keyboard: &[Vec<InlineButton>],
    ) -> Result<(), TelegramError> {
        let media = serde_json::json!({
            "type": "photo",
            "media": "attach://photo",
            "caption": caption,
            "parse_mode": "HTML",
        });
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("message_id", message_id.to_string())
            .text("media", media.to_string())
            .text("reply_markup", Self::markup_json(keyboard).to_string())
            .part("photo", Self::photo_part(image));
        let _: serde_json::Value = self.call_multipart("editMessageMedia", form).await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &serde_json::json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn ban_member(
        &self,
        chat_id: i64,
        user_id: i64,
        until: DateTime<Utc>,
    ) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "banChatMember",
                &serde_json::json!({
                    "chat_id": chat_id,
                    "user_id": user_id,
                    "until_date": until.timestamp(),
                }),
            )
            .await?;
        Ok(())
    }

    async fn is_admin(&self, chat_id: i64, user_id: i64) -> Result<bool, TelegramError> {
        let member: ChatMember = self
            .call(
                "getChatMember",
                &serde_json::json!({ "chat_id": chat_id, "user_id": user_id }),
            )
            .await?;
        Ok(member.status.is_admin())
    }

    async fn has_left(&self, chat_id: i64, user_id: i64) -> Result<bool, TelegramError> {
        let member: ChatMember = self
            .call(
                "getChatMember",
                &serde_json::json!({ "chat_id": chat_id, "user_id": user_id }),
            )
            .await?;
        Ok(member.status.has_left())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &serde_json::json!({ "callback_query_id": callback_id, "text": text }),
            )
            .await?;
        Ok(())
    }
}
