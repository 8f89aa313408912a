//! Daily expiry sweep: demotes subscribers whose expiry date has passed and
//! notifies both the subscriber and the owner.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::connection::DatabaseManager;
use crate::database::models::Subscriber;
use crate::services::notifier::Notifier;
use crate::utils::datetime::format_date;

pub struct SweeperService {
    notifier: Notifier,
    db: Arc<DatabaseManager>,
    scheduler: JobScheduler,
}

impl SweeperService {
    pub async fn new(
        notifier: Notifier,
        db: Arc<DatabaseManager>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            notifier,
            db,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Run the sweep once a day at 6 AM UTC
        let notifier = self.notifier.clone();
        let db = self.db.clone();

        let sweep_job = Job::new_async("0 0 6 * * *", move |_uuid, _l| {
            let notifier = notifier.clone();
            let db = db.clone();
            Box::pin(async move {
                if let Err(e) = sweep_and_notify(&notifier, &db, Utc::now().date_naive()).await {
                    tracing::error!("Expiry sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(sweep_job).await?;
        self.scheduler.start().await?;

        tracing::info!("Expiry sweeper started - running daily at 6 AM UTC");
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing
    pub async fn sweep_now(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sweep_and_notify(&self.notifier, &self.db, Utc::now().date_naive()).await
    }
}

/// Flip every active subscriber whose expiry date is on or before `today` to
/// inactive and return the demoted rows.
///
/// The guarded update skips rows another (or an earlier) sweep already
/// flipped, so re-running within the same day reports each transition at
/// most once.
pub async fn expire_due(
    pool: &sqlx::SqlitePool,
    today: NaiveDate,
) -> Result<Vec<Subscriber>, sqlx::Error> {
    let due = Subscriber::list_active_due(pool, &format_date(&today)).await?;

    let mut demoted = Vec::new();
    for subscriber in due {
        let result = sqlx::query(
            "UPDATE subscribers SET subscription_status = 'inactive' \
             WHERE user_id = ? AND subscription_status = 'active'"
        )
        .bind(subscriber.user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            demoted.push(subscriber);
        }
    }

    Ok(demoted)
}

async fn sweep_and_notify(
    notifier: &Notifier,
    db: &DatabaseManager,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let demoted = expire_due(&db.pool, today).await?;

    if demoted.is_empty() {
        tracing::info!("Expiry sweep: nothing due");
        return Ok(());
    }

    tracing::info!("Expiry sweep: {} subscription(s) expired", demoted.len());

    for subscriber in &demoted {
        // The status flip is already committed; a lost notice here is an
        // accepted at-least-once gap, logged so an operator can reconcile.
        if let Err(e) = notifier
            .notify_user(subscriber.user_id, "Your subscription has expired.")
            .await
        {
            tracing::error!(
                "Expiry notice to user {} was not delivered: {}",
                subscriber.user_id,
                e
            );
        }

        let audit = format!("Subscription expired for user {}.", subscriber.username);
        if let Err(e) = notifier.notify_owner(&audit).await {
            tracing::error!(
                "Owner audit notice for user {} was not delivered: {}",
                subscriber.user_id,
                e
            );
        }
    }

    Ok(())
}
