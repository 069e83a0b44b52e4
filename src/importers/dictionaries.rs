use sqlx::PgPool;

use crate::error::Result;
use crate::importers::report::ImportReport;
use crate::models::dictionary::{
    Dictionary, DEFAULT_VACANCY_SOURCE_CODE, DEFAULT_VACANCY_SOURCE_NAME,
};

pub const VACANCY_SOURCES: &str = "vacancy source";

/// Seeds every auxiliary dictionary. Existing names are left as they are.
pub async fn seed(pool: &PgPool) -> Result<ImportReport<&'static str>> {
    let mut report = ImportReport::new();

    for dictionary in Dictionary::ALL {
        let sql = format!(
            "INSERT INTO {} (name, sort_order) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
            dictionary.table()
        );
        for (order, name) in dictionary.seed().iter().enumerate() {
            let result = sqlx::query(&sql)
                .bind(name)
                .bind(order as i32)
                .execute(pool)
                .await?;
            if result.rows_affected() == 1 {
                tracing::info!("Created {}: {}", dictionary.label(), name);
                report.record_created(dictionary.label());
            } else {
                report.skipped += 1;
            }
        }
    }

    if ensure_vacancy_source(pool).await?.1 {
        report.record_created(VACANCY_SOURCES);
    }

    Ok(report)
}

/// Id of the default vacancy source, creating it on first use. The flag is
/// true when the row was created by this call.
pub async fn ensure_vacancy_source(pool: &PgPool) -> Result<(i64, bool)> {
    let created = sqlx::query(
        "INSERT INTO vacancy_sources (code, name) VALUES ($1, $2) ON CONFLICT (code) DO NOTHING",
    )
    .bind(DEFAULT_VACANCY_SOURCE_CODE)
    .bind(DEFAULT_VACANCY_SOURCE_NAME)
    .execute(pool)
    .await?
    .rows_affected()
        == 1;

    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM vacancy_sources WHERE code = $1")
        .bind(DEFAULT_VACANCY_SOURCE_CODE)
        .fetch_one(pool)
        .await?;

    Ok((id, created))
}

/// First entry of a dictionary by display order.
pub async fn first_by_order(pool: &PgPool, dictionary: Dictionary) -> Result<Option<i64>> {
    let sql = format!(
        "SELECT id FROM {} ORDER BY sort_order, id LIMIT 1",
        dictionary.table()
    );
    let id = sqlx::query_scalar::<_, i64>(&sql)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}
