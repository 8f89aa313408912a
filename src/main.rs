//! # Subscription Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, imports
//! activation codes when a sheet is configured, starts the expiry sweeper,
//! and runs the Telegram bot.

use anyhow::Result;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod database;
mod services;
mod utils;

use crate::bot::handlers::{BotHandler, ConversationState};
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::models::ActivationCode;
use crate::services::health::HealthService;
use crate::services::notifier::Notifier;
use crate::services::sweeper::SweeperService;
use crate::utils::spreadsheet::parse_code_sheet;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subscription_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Subscription Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}",
        config.database_url, config.http_port
    );

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    // Seed activation codes from the configured sheet, if any
    if let Some(path) = &config.codes_file {
        info!("Importing activation codes from {}", path);
        let contents = tokio::fs::read_to_string(path).await?;
        let rows = parse_code_sheet(&contents)?;
        let inserted = ActivationCode::import_unused(&db_arc.pool, &rows).await?;
        info!("Imported {} new activation code(s)", inserted);
    }

    // Initialize bot
    info!("Initializing Telegram bot...");
    let telegram_bot = Bot::new(&config.telegram_bot_token);
    let notifier = Notifier::new(telegram_bot.clone(), config.owner_chat_id);
    let handler = BotHandler::new(db_arc.as_ref().clone(), notifier.clone());
    info!("Telegram bot initialized successfully");

    // Initialize and start the expiry sweeper
    info!("Initializing expiry sweeper...");
    let mut sweeper = match SweeperService::new(notifier, db_arc.clone()).await {
        Ok(service) => {
            info!("Expiry sweeper initialized successfully");
            service
        }
        Err(e) => {
            tracing::error!("Failed to create expiry sweeper: {}", e);
            return Err(anyhow::anyhow!("Failed to create expiry sweeper: {}", e));
        }
    };

    if let Err(e) = sweeper.start().await {
        tracing::error!("Failed to start expiry sweeper: {}", e);
    } else {
        info!("Expiry sweeper started successfully");
    }

    // Initialize health service
    let health_service = HealthService::new(db_arc.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        let storage: std::sync::Arc<InMemStorage<ConversationState>> = InMemStorage::new().into();
        Dispatcher::builder(telegram_bot, handler.schema())
            .dependencies(dptree::deps![storage])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    // Stop the sweeper on shutdown
    if let Err(e) = sweeper.stop().await {
        tracing::warn!("Error stopping expiry sweeper: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
