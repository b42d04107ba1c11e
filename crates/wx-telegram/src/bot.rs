//! Telegram bot wiring
//!
//! Dispatches incoming updates, converts them into platform-neutral chat
//! events and forwards them to the controller.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::Message;
use tracing::{error, info};

use wx_bot::{BotController, ChatEvent};

use crate::error::Result;
use crate::responder::TelegramResponder;

/// Telegram bot wrapper
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    /// Create a new Telegram bot
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    /// Responder handle for this bot
    pub fn responder(&self) -> TelegramResponder {
        TelegramResponder::new(self.bot.clone())
    }

    /// The bot's own user id, used to suppress echo loops
    pub async fn self_id(&self) -> Result<String> {
        let me = self.bot.get_me().await?;
        Ok(me.id.to_string())
    }

    /// Start dispatching updates into the controller
    pub async fn start(self, controller: Arc<BotController>) -> Result<()> {
        info!("Starting Telegram bot...");

        let handler = Update::filter_message().endpoint(
            |msg: Message, controller: Arc<BotController>| async move {
                if let Some(event) = convert_message(&msg) {
                    if let Err(e) = controller.handle_event(event).await {
                        error!("Failed to handle message: {}", e);
                    }
                }
                respond(())
            },
        );

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![controller])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}

/// Render a shared location as a `geo:` URI
fn geo_uri(latitude: f64, longitude: f64) -> String {
    format!("geo:{},{}", latitude, longitude)
}

/// Convert a Telegram message into a chat event
///
/// Messages without a sender or without location/text content (stickers,
/// joins, ...) are dropped.
fn convert_message(msg: &Message) -> Option<ChatEvent> {
    let sender = msg.from.as_ref()?.id.to_string();
    let room = msg.chat.id.to_string();

    if let Some(location) = msg.location() {
        Some(ChatEvent::location(
            room,
            sender,
            geo_uri(location.latitude, location.longitude),
        ))
    } else {
        msg.text()
            .map(|text| ChatEvent::text(room, sender, text))
    }
}
