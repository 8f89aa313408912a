pub mod import;
pub mod status;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Subscription bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot and show the main menu")]
    Start,
    #[command(description = "Show your subscription status")]
    Status,
    #[command(description = "Import activation codes from a spreadsheet export (owner only)")]
    Import { path: String },
}
