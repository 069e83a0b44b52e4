use crate::dto::reference_dto::ReferenceSearchQuery;
use crate::error::Result;
use crate::models::location::SettlementPath;
use crate::models::occupation::JobTitle;
use sqlx::PgPool;

#[derive(Clone)]
pub struct ReferenceService {
    pool: PgPool,
}

impl ReferenceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settlements whose name starts with the term, with their full path.
    pub async fn settlements(&self, query: &ReferenceSearchQuery) -> Result<Vec<SettlementPath>> {
        let pattern = query.term().map(|q| format!("{}%", q));
        let items = sqlx::query_as::<_, SettlementPath>(
            r#"
            SELECT
                s.id, s.code, s.name, s.category,
                c.name AS community, d.name AS district, r.name AS region
            FROM settlements s
            JOIN communities c ON c.id = s.community_id
            JOIN districts d ON d.id = c.district_id
            JOIN regions r ON r.id = d.region_id
            WHERE $1::text IS NULL OR s.name ILIKE $1
            ORDER BY s.name, r.name
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(query.limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Job titles by code prefix or by a fragment of the name.
    pub async fn job_titles(&self, query: &ReferenceSearchQuery) -> Result<Vec<JobTitle>> {
        let term = query.term();
        let items = sqlx::query_as::<_, JobTitle>(
            r#"
            SELECT * FROM job_titles
            WHERE $1::text IS NULL
               OR code LIKE $1 || '%'
               OR name ILIKE '%' || $1 || '%'
            ORDER BY code, name
            LIMIT $2
            "#,
        )
        .bind(term)
        .bind(query.limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
