//! Subscription lifecycle policy: code redemption, expiry computation, and
//! entitlement checks. This is the only module that mutates the subscriber
//! ledger and the code store together.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::database::models::ActivationCode;
use crate::utils::datetime::{format_date, parse_date};

/// Length of the subscription period granted per redeemed code.
pub const SUBSCRIPTION_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum ActivationError {
    /// The submitted code is unknown or already burned. User-recoverable.
    #[error("activation code is invalid or already used")]
    InvalidCode,
    /// Storage failure; the activation was rolled back and nothing was
    /// partially applied.
    #[error("storage failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Compute the expiry date a redemption yields.
///
/// A renewal made while the subscription is still running stacks on top of
/// the remaining time: redeeming 5 days before expiry yields 35 days from
/// today, not 30. Lapsed time is not carried forward, and an expiry equal
/// to today counts as lapsed.
pub fn compute_new_expiry(current: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    match current {
        Some(expiry) if expiry > today => expiry + Duration::days(SUBSCRIPTION_DAYS),
        _ => today + Duration::days(SUBSCRIPTION_DAYS),
    }
}

/// Redeem `code` for `user_id`, creating or extending the subscription.
///
/// The code burn and the ledger update happen in one transaction: a code is
/// never consumed without a durable extension, and vice versa. The burn runs
/// first so the transaction holds the write lock before reading the current
/// expiry; two racing activations on the same code serialize and exactly one
/// succeeds.
pub async fn activate(
    pool: &sqlx::SqlitePool,
    user_id: i64,
    username: &str,
    code: &str,
    today: NaiveDate,
) -> Result<NaiveDate, ActivationError> {
    let mut tx = pool.begin().await?;

    let burned = ActivationCode::mark_used(&mut *tx, code).await?;
    if !burned {
        // Dropping the transaction rolls it back.
        return Err(ActivationError::InvalidCode);
    }

    let current_expiry: Option<String> = sqlx::query_scalar(
        "SELECT expiry_date FROM subscribers WHERE user_id = ?"
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let current = current_expiry
        .as_deref()
        .and_then(|d| parse_date(d).ok());
    let new_expiry = compute_new_expiry(current, today);

    // activation_date is set on first activation only and never updated.
    sqlx::query(
        "INSERT INTO subscribers \
             (user_id, username, activation_code, activation_date, expiry_date, subscription_status) \
         VALUES (?, ?, ?, ?, ?, 'active') \
         ON CONFLICT(user_id) DO UPDATE SET \
             username = excluded.username, \
             activation_code = excluded.activation_code, \
             expiry_date = excluded.expiry_date, \
             subscription_status = 'active'"
    )
    .bind(user_id)
    .bind(username)
    .bind(code)
    .bind(format_date(&today))
    .bind(format_date(&new_expiry))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Activation: user {} extended to {}",
        user_id,
        format_date(&new_expiry)
    );

    Ok(new_expiry)
}

/// Current entitlement for `user_id`: `Some(expiry)` iff a ledger record
/// exists and its expiry date is after `today`.
///
/// Deliberately ignores `subscription_status`, which may be stale until the
/// next sweep; the expiry date is the source of truth.
pub async fn check_subscribed(
    pool: &sqlx::SqlitePool,
    user_id: i64,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, sqlx::Error> {
    let expiry: Option<String> = sqlx::query_scalar(
        "SELECT expiry_date FROM subscribers WHERE user_id = ?"
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(expiry
        .as_deref()
        .and_then(|d| parse_date(d).ok())
        .filter(|expiry| *expiry > today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fresh_subscription_runs_30_days() {
        let today = date(2024, 6, 1);
        assert_eq!(compute_new_expiry(None, today), date(2024, 7, 1));
    }

    #[test]
    fn test_renewal_stacks_on_remaining_time() {
        let today = date(2024, 6, 1);
        let expiry = date(2024, 6, 6); // 5 days left
        assert_eq!(compute_new_expiry(Some(expiry), today), date(2024, 7, 6));
    }

    #[test]
    fn test_lapsed_subscription_resets_to_today() {
        let today = date(2024, 6, 1);
        let expiry = date(2024, 5, 31);
        assert_eq!(compute_new_expiry(Some(expiry), today), date(2024, 7, 1));
    }

    #[test]
    fn test_expiry_today_counts_as_lapsed() {
        let today = date(2024, 6, 1);
        assert_eq!(compute_new_expiry(Some(today), today), date(2024, 7, 1));
    }
}
