use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::error::Result;

/// Creation time before which an active vacancy counts as stale.
pub fn stale_threshold(now: DateTime<Utc>, max_age_days: i64) -> DateTime<Utc> {
    now - Duration::days(max_age_days)
}

/// Deactivates active vacancies created before the threshold and returns how
/// many were touched.
pub async fn deactivate_stale(pool: &PgPool, now: DateTime<Utc>, max_age_days: i64) -> Result<u64> {
    let threshold = stale_threshold(now, max_age_days);
    let result = sqlx::query(
        "UPDATE vacancies SET is_active = FALSE, updated_at = NOW() \
         WHERE is_active AND created_at < $1",
    )
    .bind(threshold)
    .execute(pool)
    .await?;

    let count = result.rows_affected();
    if count > 0 {
        tracing::info!("Deactivated {} stale vacancies", count);
    } else {
        tracing::info!("No stale vacancies found");
    }
    Ok(count)
}
