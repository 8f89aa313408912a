use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;

use crate::bot::commands::Command;
use crate::bot::handlers::HandlerResult;
use crate::database::connection::DatabaseManager;
use crate::services::notifier::Notifier;

/// Callback payloads used by the /start keyboard.
pub const CALLBACK_ACTIVATE: &str = "activate";
pub const CALLBACK_CARD: &str = "card";

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: DatabaseManager,
    notifier: Notifier,
) -> HandlerResult {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
        }
        Command::Start => {
            let keyboard = InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback(
                    "Activate subscription",
                    CALLBACK_ACTIVATE,
                )],
                vec![InlineKeyboardButton::callback(
                    "Get a subscription card",
                    CALLBACK_CARD,
                )],
            ]);
            bot.send_message(msg.chat.id, "Welcome! Choose one of the options:")
                .reply_markup(keyboard)
                .await?;
        }
        Command::Status => {
            crate::bot::commands::status::handle_status(bot, msg, &db).await?;
        }
        Command::Import { path } => {
            crate::bot::commands::import::handle_import(bot, msg, path, &db, &notifier).await?;
        }
    }
    Ok(())
}
