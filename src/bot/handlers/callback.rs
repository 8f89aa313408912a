use chrono::Utc;
use teloxide::prelude::*;

use crate::bot::handlers::message::{CALLBACK_ACTIVATE, CALLBACK_CARD};
use crate::bot::handlers::{ConversationDialogue, ConversationState, HandlerResult};
use crate::database::connection::DatabaseManager;
use crate::services::subscription;
use crate::utils::datetime::format_date;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: ConversationDialogue,
    db: DatabaseManager,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let user_id = q.from.id.0 as i64;
    let username = q.from.username.as_deref().unwrap_or("unknown");

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    tracing::info!("Callback received: '{}' from user {} ({})", data, username, user_id);

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };

    match data {
        CALLBACK_ACTIVATE => {
            match subscription::check_subscribed(&db.pool, user_id, Utc::now().date_naive()).await {
                Ok(Some(expiry)) => {
                    bot.edit_message_text(
                        message.chat.id,
                        message.id,
                        format!(
                            "You are already subscribed. Your subscription expires on {}.",
                            format_date(&expiry)
                        ),
                    )
                    .await?;
                }
                Ok(None) => {
                    bot.edit_message_text(
                        message.chat.id,
                        message.id,
                        "Enter your activation code:",
                    )
                    .await?;
                    dialogue.update(ConversationState::AwaitingCode).await?;
                }
                Err(e) => {
                    tracing::error!("Subscription check failed for user {}: {}", user_id, e);
                    bot.send_message(
                        message.chat.id,
                        "Something went wrong. Please try again later.",
                    )
                    .await?;
                }
            }
        }
        CALLBACK_CARD => {
            bot.edit_message_text(
                message.chat.id,
                message.id,
                "Subscription cards are available at the Alef Ba bookstore.",
            )
            .await?;
        }
        _ => {
            tracing::warn!("Unknown callback payload: '{}'", data);
        }
    }

    Ok(())
}
