//! # Subscription Bot
//!
//! A Telegram bot that manages 30-day subscriptions redeemed with one-time
//! activation codes.
//!
//! ## Features
//! - Redeem activation codes for a 30-day subscription
//! - Renewals stack on top of remaining time; lapsed time is not carried over
//! - Bulk code import from a spreadsheet export
//! - Daily sweep that demotes expired subscribers and notifies the owner
//! - Persistent storage with SQLite

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Background services: subscription engine, expiry sweeper, notifications
pub mod services;
/// Utility functions for dates, validation, and code sheet parsing
pub mod utils;
