use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user with a subscription lifecycle record.
///
/// Dates are stored as `YYYY-MM-DD` strings; `expiry_date` is the source of
/// truth for entitlement. `subscription_status` is reconciled by the daily
/// sweep and may lag behind `expiry_date` between sweeps.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subscriber {
    pub user_id: i64,
    pub username: String,
    pub activation_code: Option<String>,
    pub activation_date: Option<String>,
    pub expiry_date: Option<String>,
    pub subscription_status: String,
}

const SUBSCRIBER_COLUMNS: &str =
    "user_id, username, activation_code, activation_date, expiry_date, subscription_status";

impl Subscriber {
    pub async fn find_by_user_id(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Best-effort lookup by display name. Usernames are neither unique nor
    /// stable on Telegram, so this may return any matching row, or none;
    /// it must never be used as a primary key.
    pub async fn find_by_username(
        pool: &sqlx::SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE username = ? LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// All subscribers still marked active whose expiry date is on or before
    /// `threshold` (a `YYYY-MM-DD` string). Input for the expiry sweep.
    pub async fn list_active_due(
        pool: &sqlx::SqlitePool,
        threshold: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers \
             WHERE subscription_status = 'active' AND expiry_date <= ? \
             ORDER BY expiry_date"
        ))
        .bind(threshold)
        .fetch_all(pool)
        .await
    }

    pub async fn set_status(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE subscribers SET subscription_status = ? WHERE user_id = ?")
            .bind(status)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of subscribers currently marked active.
    pub async fn count_active(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subscribers WHERE subscription_status = 'active'"
        )
        .fetch_one(pool)
        .await
    }
}
