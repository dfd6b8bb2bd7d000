use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Outbound transport. The dispatch loop and the conversation layer only
/// ever talk to this trait; tests substitute a recording implementation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    async fn send_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: JsonValue,
    ) -> Result<()>;
}

/// Telegram Bot API client over plain `sendMessage` calls.
#[derive(Clone)]
pub struct TelegramService {
    client: reqwest::Client,
    bot_token: String,
}

impl TelegramService {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token,
        }
    }

    async fn send(&self, chat_id: i64, text: &str, reply_markup: Option<JsonValue>) -> Result<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );

        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = markup;
        }

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "Telegram sendMessage to {} failed: {} {}",
                chat_id, status, detail
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramService {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send(chat_id, text, None).await
    }

    async fn send_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: JsonValue,
    ) -> Result<()> {
        self.send(chat_id, text, Some(reply_markup)).await
    }
}
