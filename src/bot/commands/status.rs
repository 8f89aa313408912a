use chrono::Utc;
use teloxide::prelude::*;

use crate::bot::handlers::HandlerResult;
use crate::database::connection::DatabaseManager;
use crate::services::subscription;
use crate::utils::datetime::format_date;

/// `/status` - the sender's own entitlement, judged by expiry date alone.
pub async fn handle_status(bot: Bot, msg: Message, db: &DatabaseManager) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    match subscription::check_subscribed(&db.pool, user_id, Utc::now().date_naive()).await {
        Ok(Some(expiry)) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "You are subscribed. Your subscription expires on {}.",
                    format_date(&expiry)
                ),
            )
            .await?;
        }
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                "You are not subscribed. Use /start to activate a subscription.",
            )
            .await?;
        }
        Err(e) => {
            tracing::error!("Status lookup failed for user {}: {}", user_id, e);
            bot.send_message(msg.chat.id, "Something went wrong. Please try again later.")
                .await?;
        }
    }

    Ok(())
}
