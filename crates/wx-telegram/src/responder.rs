//! Responder implementation over the Telegram Bot API

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId, ParseMode};
use tracing::debug;

use wx_bot::{BotError, MediaMessage, MessageHandle, Responder, RoomId};

/// [`Responder`] backed by a teloxide [`Bot`]
#[derive(Clone)]
pub struct TelegramResponder {
    bot: Bot,
}

impl TelegramResponder {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Parse a room id back into a Telegram chat id
fn chat_id(room: &RoomId) -> Result<ChatId, BotError> {
    room.0
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| BotError::Responder(format!("Invalid chat id: {}", room.0)))
}

/// Parse a message handle back into a Telegram message id
fn message_id(handle: &MessageHandle) -> Result<MessageId, BotError> {
    handle
        .0
        .parse::<i32>()
        .map(MessageId)
        .map_err(|_| BotError::Responder(format!("Invalid message id: {}", handle.0)))
}

fn api_error(e: teloxide::RequestError) -> BotError {
    BotError::Responder(e.to_string())
}

#[async_trait]
impl Responder for TelegramResponder {
    async fn send(&self, room: &RoomId, text: &str) -> Result<MessageHandle, BotError> {
        let message = self
            .bot
            .send_message(chat_id(room)?, text)
            .await
            .map_err(api_error)?;

        Ok(MessageHandle(message.id.0.to_string()))
    }

    async fn send_html(&self, room: &RoomId, html: &str) -> Result<MessageHandle, BotError> {
        let message = self
            .bot
            .send_message(chat_id(room)?, html)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(api_error)?;

        Ok(MessageHandle(message.id.0.to_string()))
    }

    async fn edit(&self, room: &RoomId, handle: &MessageHandle, text: &str) -> Result<(), BotError> {
        self.bot
            .edit_message_text(chat_id(room)?, message_id(handle)?, text)
            .await
            .map_err(api_error)?;

        Ok(())
    }

    async fn redact(&self, room: &RoomId, handle: &MessageHandle) -> Result<(), BotError> {
        self.bot
            .delete_message(chat_id(room)?, message_id(handle)?)
            .await
            .map_err(api_error)?;

        Ok(())
    }

    async fn send_media(&self, room: &RoomId, media: MediaMessage) -> Result<(), BotError> {
        debug!(
            "Sending {} media message ({} bytes, {}x{})",
            media.mime_type,
            media.bytes.len(),
            media.width,
            media.height
        );

        let photo = InputFile::memory(media.bytes).file_name("weather.png");

        self.bot
            .send_photo(chat_id(room)?, photo)
            .caption(media.caption)
            .await
            .map_err(api_error)?;

        Ok(())
    }
}
