//! Telegram transport.
//!
//! Long-polls Telegram with a teloxide dispatcher, hands every text message
//! to the [`Assistant`] and sends its reply back to the same chat.

use crate::assistant::Assistant;
use crate::error::{DeliveryError, StartupError};
use crate::reply::{Keyboard, Reply};
use async_trait::async_trait;
use chrono::Utc;
use rootcause::prelude::ResultExt;
use rusgo_core::UserId;
use std::sync::Arc;
use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatId, KeyboardButton, KeyboardMarkup, Message, Update};
use tracing::{debug, error, info};

/// Sends replies to a chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Delivers `reply` to `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the messaging service rejects the message.
    async fn send(&self, chat_id: i64, reply: Reply) -> rusgo_core::Result<(), DeliveryError>;
}

/// [`ChatTransport`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, chat_id: i64, reply: Reply) -> rusgo_core::Result<(), DeliveryError> {
        let request = self.bot.send_message(ChatId(chat_id), reply.text);
        let request = match reply.keyboard {
            Some(keyboard) => request.reply_markup(keyboard_markup(&keyboard)),
            None => request,
        };

        request.await.context(DeliveryError { chat_id })?;
        Ok(())
    }
}

/// Converts a keyboard into a resized Telegram reply keyboard.
#[must_use]
pub fn keyboard_markup(keyboard: &Keyboard) -> KeyboardMarkup {
    KeyboardMarkup::new(
        keyboard
            .rows
            .iter()
            .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>()),
    )
    .resize_keyboard()
}

/// Polls Telegram until Ctrl-C.
///
/// Updates queued while the bot was offline are dropped.
///
/// # Errors
///
/// Returns an error if Telegram rejects the startup call.
pub async fn run(bot: Bot, assistant: Arc<Assistant>) -> rusgo_core::Result<(), StartupError> {
    bot.delete_webhook()
        .drop_pending_updates(true)
        .await
        .context(StartupError::Transport)?;

    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(bot.clone()));

    info!("starting long polling");
    Dispatcher::builder(bot, Update::filter_message().endpoint(on_message))
        .dependencies(dptree::deps![assistant, transport])
        .default_handler(|_| async {})
        .error_handler(LoggingErrorHandler::with_custom_text(
            "error in message handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("dispatcher stopped");
    Ok(())
}

async fn on_message(
    msg: Message,
    assistant: Arc<Assistant>,
    transport: Arc<dyn ChatTransport>,
) -> ResponseResult<()> {
    let (Some(text), Some(user)) = (msg.text(), msg.from.as_ref()) else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };
    let Ok(user_id) = i64::try_from(user.id.0).map(UserId::new) else {
        debug!(telegram_user = user.id.0, "ignoring out-of-range user id");
        return Ok(());
    };

    let reply = assistant.handle(user_id, text, Utc::now()).await;

    if let Err(report) = transport.send(msg.chat.id.0, reply).await {
        error!(%user_id, error = %report, "failed to send reply");
    }
    Ok(())
}
