use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    /// Chat id of the owner account that receives audit notifications.
    pub owner_chat_id: i64,
    /// Optional spreadsheet export (CSV) of activation codes imported at startup.
    pub codes_file: Option<String>,
    pub http_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let owner_chat_id = env::var("OWNER_CHAT_ID")
            .map_err(|_| anyhow!("OWNER_CHAT_ID must be set"))?
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid OWNER_CHAT_ID"))?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/subscribers.db".to_string());
        let database_url = if database_url.trim().is_empty() {
            "sqlite:./data/subscribers.db".to_string()
        } else {
            database_url
        };

        let codes_file = env::var("CODES_FILE")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            owner_chat_id,
            codes_file,
            http_port,
        })
    }
}
