use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single-use token that grants or extends a subscription.
///
/// `is_used` only ever transitions false -> true; rows are never deleted, so
/// a burned code can keep serving as a historical pointer from the ledger.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ActivationCode {
    pub code: String,
    pub is_used: bool,
}

impl ActivationCode {
    /// Bulk-import codes from `(code, status_label)` rows, keeping only rows
    /// labelled `unused`. Uses `INSERT OR IGNORE`, so importing the same
    /// sheet twice leaves exactly one row per unique code.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn import_unused(
        pool: &sqlx::SqlitePool,
        entries: &[(String, String)],
    ) -> Result<u64, sqlx::Error> {
        let mut inserted = 0u64;
        for (code, status) in entries {
            if !status.trim().eq_ignore_ascii_case("unused") {
                continue;
            }
            let code = code.trim();
            if code.is_empty() {
                continue;
            }
            let result = sqlx::query(
                "INSERT OR IGNORE INTO activation_codes (code, is_used) VALUES (?, 0)"
            )
            .bind(code)
            .execute(pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    /// True iff the code exists and has not been used yet.
    pub async fn is_redeemable(
        pool: &sqlx::SqlitePool,
        code: &str,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM activation_codes WHERE code = ? AND is_used = 0"
        )
        .bind(code)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    /// Burn a code. The `is_used = 0` guard makes this idempotent: an
    /// already-used or unknown code affects zero rows and returns false.
    ///
    /// Generic over the executor so the subscription engine can run it
    /// inside the same transaction as the ledger update.
    pub async fn mark_used<'e, E>(executor: E, code: &str) -> Result<bool, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE activation_codes SET is_used = 1 WHERE code = ? AND is_used = 0"
        )
        .bind(code)
        .execute(executor)
        .await?;

        let burned = result.rows_affected() > 0;
        if !burned {
            tracing::warn!("mark_used: code not burnable (unknown or already used)");
        }
        Ok(burned)
    }

    pub async fn find_by_code(
        pool: &sqlx::SqlitePool,
        code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActivationCode>(
            "SELECT code, is_used FROM activation_codes WHERE code = ?"
        )
        .bind(code)
        .fetch_optional(pool)
        .await
    }

    /// Number of codes still available for redemption.
    pub async fn count_unused(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM activation_codes WHERE is_used = 0"
        )
        .fetch_one(pool)
        .await
    }
}
