use teloxide::prelude::*;

use crate::bot::handlers::HandlerResult;
use crate::database::connection::DatabaseManager;
use crate::database::models::ActivationCode;
use crate::services::notifier::Notifier;
use crate::utils::spreadsheet::parse_code_sheet;

/// `/import <path>` - owner-only bulk import of activation codes from a
/// spreadsheet export on the bot host.
pub async fn handle_import(
    bot: Bot,
    msg: Message,
    path: String,
    db: &DatabaseManager,
    notifier: &Notifier,
) -> HandlerResult {
    if !notifier.is_owner(msg.chat.id) {
        bot.send_message(msg.chat.id, "Only the owner can import activation codes.")
            .await?;
        return Ok(());
    }

    let path = path.trim();
    if path.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /import <path-to-code-sheet.csv>")
            .await?;
        return Ok(());
    }

    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("Code sheet {} could not be read: {}", path, e);
            bot.send_message(msg.chat.id, format!("Could not read '{path}': {e}"))
                .await?;
            return Ok(());
        }
    };

    let rows = match parse_code_sheet(&contents) {
        Ok(rows) => rows,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("Could not parse '{path}': {e}"))
                .await?;
            return Ok(());
        }
    };

    match ActivationCode::import_unused(&db.pool, &rows).await {
        Ok(inserted) => {
            tracing::info!("Imported {} new activation code(s) from {}", inserted, path);
            bot.send_message(
                msg.chat.id,
                format!(
                    "Imported {inserted} new activation code(s) ({} row(s) in the sheet).",
                    rows.len()
                ),
            )
            .await?;
        }
        Err(e) => {
            tracing::error!("Code import from {} failed: {}", path, e);
            bot.send_message(msg.chat.id, "Import failed. Please check the logs.")
                .await?;
        }
    }

    Ok(())
}
