use chrono::Utc;
use teloxide::prelude::*;

use crate::bot::handlers::{ConversationDialogue, ConversationState, HandlerResult};
use crate::database::connection::DatabaseManager;
use crate::database::models::Subscriber;
use crate::services::notifier::Notifier;
use crate::services::subscription::{self, ActivationError};
use crate::utils::datetime::{format_date, parse_date};
use crate::utils::validation::{normalize_username, validate_activation_code};

/// Free-text handler. While the chat is in `AwaitingCode` the text is a code
/// submission; otherwise it is treated as a best-effort username query.
pub async fn text_handler(
    bot: Bot,
    msg: Message,
    dialogue: ConversationDialogue,
    db: DatabaseManager,
    notifier: Notifier,
) -> HandlerResult {
    let Some(text) = msg.text().map(str::to_owned) else {
        return Ok(());
    };
    let text = text.as_str();

    if text.starts_with('/') {
        bot.send_message(
            msg.chat.id,
            format!(
                "Unknown command: {}\nUse /help to see all available commands.",
                text.split_whitespace().next().unwrap_or(text)
            ),
        )
        .await?;
        return Ok(());
    }

    match dialogue.get().await?.unwrap_or_default() {
        ConversationState::AwaitingCode => {
            handle_code_submission(bot, msg, text, dialogue, &db, &notifier).await
        }
        ConversationState::Idle => handle_username_query(bot, msg, text, &db).await,
    }
}

async fn handle_code_submission(
    bot: Bot,
    msg: Message,
    text: &str,
    dialogue: ConversationDialogue,
    db: &DatabaseManager,
    notifier: &Notifier,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let username = user
        .username
        .clone()
        .unwrap_or_else(|| user.first_name.clone());

    let code = text.trim();
    if let Err(e) = validate_activation_code(code) {
        // Malformed input never reaches the store; stay in AwaitingCode.
        bot.send_message(msg.chat.id, format!("{e}. Please try again."))
            .await?;
        return Ok(());
    }

    let today = Utc::now().date_naive();
    match subscription::activate(&db.pool, user_id, &username, code, today).await {
        Ok(expiry) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "Subscription activated! Your subscription expires on {}.",
                    format_date(&expiry)
                ),
            )
            .await?;

            let audit = format!(
                "User {} activated a subscription. Expires on {}.",
                username,
                format_date(&expiry)
            );
            if let Err(e) = notifier.notify_owner(&audit).await {
                tracing::error!("Owner activation notice was not delivered: {}", e);
            }

            dialogue.update(ConversationState::Idle).await?;
        }
        Err(ActivationError::InvalidCode) => {
            // Retry prompt; the chat stays in AwaitingCode.
            bot.send_message(
                msg.chat.id,
                "That code is invalid or already used. Get a new code from the Alef Ba bookstore and try again.",
            )
            .await?;
        }
        Err(ActivationError::Persistence(e)) => {
            tracing::error!("Activation failed for user {}: {}", user_id, e);
            bot.send_message(msg.chat.id, "Something went wrong. Please try again later.")
                .await?;
            dialogue.update(ConversationState::Idle).await?;
        }
    }

    Ok(())
}

async fn handle_username_query(
    bot: Bot,
    msg: Message,
    text: &str,
    db: &DatabaseManager,
) -> HandlerResult {
    let username = match normalize_username(text) {
        Ok(username) => username,
        Err(_) => return Ok(()),
    };

    // Usernames are not unique; this lookup may return any matching row.
    let subscriber = match Subscriber::find_by_username(&db.pool, &username).await {
        Ok(subscriber) => subscriber,
        Err(e) => {
            tracing::error!("Username lookup '{}' failed: {}", username, e);
            bot.send_message(msg.chat.id, "Something went wrong. Please try again later.")
                .await?;
            return Ok(());
        }
    };

    let today = Utc::now().date_naive();
    let reply = match subscriber {
        Some(sub) => {
            let expiry = sub
                .expiry_date
                .as_deref()
                .and_then(|d| parse_date(d).ok());
            match expiry {
                Some(expiry) if expiry > today => format!(
                    "User {} is subscribed. The subscription expires on {}.",
                    username,
                    format_date(&expiry)
                ),
                _ => format!("User {username}'s subscription has expired."),
            }
        }
        None => format!("User {username} is not subscribed."),
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
