// src/telegram/api.rs — Telegram Bot API client
//
// Uses the Telegram Bot API (https://core.telegram.org/bots/api).

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::infra::errors::{HabitgramError, Result};
use crate::telegram::types::{
    BotCommand, InlineKeyboardMarkup, Message, ReplyMarkup, Update,
};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramApi {
    client: Client,
    base_url: String,
    bot_token: String,
}

#[derive(Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl TelegramApi {
    pub fn new(bot_token: String) -> Self {
        Self::with_base_url(TELEGRAM_API_BASE.to_string(), bot_token)
    }

    pub fn with_base_url(base_url: String, bot_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.bot_token)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let resp: TelegramResponse<T> = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            return Err(HabitgramError::Telegram(format!(
                "{method} failed: {}",
                resp.description.unwrap_or_else(|| "unknown".into())
            )));
        }
        resp.result.ok_or_else(|| {
            HabitgramError::Telegram(format!("{method} returned an empty result"))
        })
    }

    /// Validate the bot token by calling getMe; returns the bot username.
    pub async fn get_me(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct BotUser {
            username: Option<String>,
            first_name: Option<String>,
        }

        let bot: BotUser = self.call("getMe", &serde_json::json!({})).await?;
        Ok(bot
            .username
            .or(bot.first_name)
            .unwrap_or_else(|| "unknown".into()))
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        self.call("getUpdates", &body).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<Message> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(markup) = markup {
            body["reply_markup"] = serde_json::to_value(markup)
                .map_err(|e| HabitgramError::Telegram(e.to_string()))?;
        }
        self.call("sendMessage", &body).await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(markup) = markup {
            body["reply_markup"] = serde_json::to_value(markup)
                .map_err(|e| HabitgramError::Telegram(e.to_string()))?;
        }
        let _: serde_json::Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    pub async fn edit_message_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        markup: &InlineKeyboardMarkup,
    ) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "reply_markup": serde_json::to_value(markup)
                .map_err(|e| HabitgramError::Telegram(e.to_string()))?,
        });
        let _: serde_json::Value = self.call("editMessageReplyMarkup", &body).await?;
        Ok(())
    }

    /// Acknowledge a button press so the client stops its spinner.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let body = serde_json::json!({ "callback_query_id": callback_query_id });
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<()> {
        let body = serde_json::json!({
            "commands": serde_json::to_value(commands)
                .map_err(|e| HabitgramError::Telegram(e.to_string()))?,
        });
        let _: bool = self.call("setMyCommands", &body).await?;
        Ok(())
    }

    pub async fn pin_chat_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "disable_notification": true,
        });
        let _: bool = self.call("pinChatMessage", &body).await?;
        Ok(())
    }
}
