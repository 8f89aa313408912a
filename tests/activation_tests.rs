use anyhow::Result;
use chrono::NaiveDate;
use subscription_bot::database::{connection::DatabaseManager, models::*};
use subscription_bot::services::subscription::{self, ActivationError};
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

async fn seed_codes(pool: &sqlx::SqlitePool, codes: &[&str]) -> Result<()> {
    let entries: Vec<(String, String)> = codes
        .iter()
        .map(|c| (c.to_string(), "unused".to_string()))
        .collect();
    ActivationCode::import_unused(pool, &entries).await?;
    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_fresh_activation_grants_30_days() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    seed_codes(&db.pool, &["CODE1"]).await?;
    let today = date(2024, 6, 1);

    let expiry = subscription::activate(&db.pool, 100, "alice", "CODE1", today).await?;

    assert_eq!(expiry, date(2024, 7, 1));
    assert_eq!(
        subscription::check_subscribed(&db.pool, 100, today).await?,
        Some(date(2024, 7, 1))
    );

    let sub = Subscriber::find_by_user_id(&db.pool, 100).await?.unwrap();
    assert_eq!(sub.username, "alice");
    assert_eq!(sub.activation_code.as_deref(), Some("CODE1"));
    assert_eq!(sub.activation_date.as_deref(), Some("2024-06-01"));
    assert_eq!(sub.expiry_date.as_deref(), Some("2024-07-01"));
    assert_eq!(sub.subscription_status, "active");

    Ok(())
}

#[tokio::test]
async fn test_renewal_stacks_on_remaining_time() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    seed_codes(&db.pool, &["CODE1", "CODE2"]).await?;

    subscription::activate(&db.pool, 100, "alice", "CODE1", date(2024, 5, 7)).await?;
    // 5 days of validity remain on 2024-06-01
    let expiry =
        subscription::activate(&db.pool, 100, "alice", "CODE2", date(2024, 6, 1)).await?;

    // 5 remaining + 30 new = 35 days from "now", not 30
    assert_eq!(expiry, date(2024, 7, 6));

    Ok(())
}

#[tokio::test]
async fn test_lapsed_renewal_resets_to_today() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    seed_codes(&db.pool, &["CODE1", "CODE2"]).await?;

    subscription::activate(&db.pool, 100, "alice", "CODE1", date(2024, 4, 1)).await?;
    // Expired 2024-05-01; lapsed time is not carried forward
    let expiry =
        subscription::activate(&db.pool, 100, "alice", "CODE2", date(2024, 6, 1)).await?;

    assert_eq!(expiry, date(2024, 7, 1));

    Ok(())
}

#[tokio::test]
async fn test_renewal_keeps_original_activation_date() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    seed_codes(&db.pool, &["CODE1", "CODE2"]).await?;

    subscription::activate(&db.pool, 100, "alice", "CODE1", date(2024, 5, 1)).await?;
    subscription::activate(&db.pool, 100, "alice", "CODE2", date(2024, 5, 10)).await?;

    let sub = Subscriber::find_by_user_id(&db.pool, 100).await?.unwrap();
    assert_eq!(sub.activation_date.as_deref(), Some("2024-05-01"));
    assert_eq!(sub.activation_code.as_deref(), Some("CODE2"));

    Ok(())
}

#[tokio::test]
async fn test_code_is_single_use_across_users() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    seed_codes(&db.pool, &["CODE1"]).await?;
    let today = date(2024, 6, 1);

    subscription::activate(&db.pool, 100, "alice", "CODE1", today).await?;

    let result = subscription::activate(&db.pool, 200, "bob", "CODE1", today).await;
    assert!(matches!(result, Err(ActivationError::InvalidCode)));

    // The failed attempt must not create a ledger record
    assert!(Subscriber::find_by_user_id(&db.pool, 200).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_unknown_code_is_rejected() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let today = date(2024, 6, 1);

    let result = subscription::activate(&db.pool, 100, "alice", "NOPE", today).await;
    assert!(matches!(result, Err(ActivationError::InvalidCode)));
    assert!(Subscriber::find_by_user_id(&db.pool, 100).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_check_subscribed_ignores_stale_status() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    seed_codes(&db.pool, &["CODE1"]).await?;

    subscription::activate(&db.pool, 100, "alice", "CODE1", date(2024, 6, 1)).await?;
    // Simulate a stale status the sweeper has not reconciled yet
    Subscriber::set_status(&db.pool, 100, "inactive").await?;

    // Entitlement is judged by expiry date alone
    assert!(subscription::check_subscribed(&db.pool, 100, date(2024, 6, 2))
        .await?
        .is_some());

    Ok(())
}

#[tokio::test]
async fn test_check_subscribed_expiry_boundary() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    seed_codes(&db.pool, &["CODE1"]).await?;

    subscription::activate(&db.pool, 100, "alice", "CODE1", date(2024, 6, 1)).await?;

    // Expires 2024-07-01: still entitled the day before, not on the day itself
    assert!(subscription::check_subscribed(&db.pool, 100, date(2024, 6, 30))
        .await?
        .is_some());
    assert!(subscription::check_subscribed(&db.pool, 100, date(2024, 7, 1))
        .await?
        .is_none());

    Ok(())
}

#[tokio::test]
async fn test_check_subscribed_unknown_user() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    assert!(subscription::check_subscribed(&db.pool, 12345, date(2024, 6, 1))
        .await?
        .is_none());

    Ok(())
}

#[tokio::test]
async fn test_concurrent_activations_burn_code_exactly_once() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    seed_codes(&db.pool, &["CODE1"]).await?;
    let today = date(2024, 6, 1);

    let (first, second) = tokio::join!(
        subscription::activate(&db.pool, 100, "alice", "CODE1", today),
        subscription::activate(&db.pool, 200, "bob", "CODE1", today),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    let invalid = [&first, &second]
        .iter()
        .filter(|r| matches!(r, Err(ActivationError::InvalidCode)))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(invalid, 1);
    assert!(!ActivationCode::is_redeemable(&db.pool, "CODE1").await?);

    Ok(())
}
