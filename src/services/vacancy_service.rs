use crate::dto::vacancy_dto::{CreateVacancyPayload, UpdateVacancyPayload, VacancyListQuery};
use crate::error::{Error, Result};
use crate::models::vacancy::{SaveRules, Vacancy, VacancyStatus, CURRENCIES};
use crate::utils::pagination::{PageWindow, Paginated};
use crate::utils::time::now;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Clone)]
pub struct VacancyService {
    pool: PgPool,
}

const LIST_FILTER: &str = r#"
    ($1::text IS NULL OR title ILIKE $1)
    AND ($2::uuid IS NULL OR employer_id = $2)
    AND ($3::bigint IS NULL OR settlement_id = $3)
    AND ($4::bigint IS NULL OR job_title_id = $4)
    AND ($5 OR is_active)
"#;

pub fn parse_status(value: Option<&str>, default: VacancyStatus) -> Result<VacancyStatus> {
    match value {
        None => Ok(default),
        Some(raw) => VacancyStatus::parse(raw)
            .ok_or_else(|| Error::BadRequest(format!("Unknown vacancy status: {}", raw))),
    }
}

pub fn check_terms(currency: &str, salary_min: Option<i32>, salary_max: Option<i32>) -> Result<()> {
    if !CURRENCIES.contains(&currency) {
        return Err(Error::BadRequest(format!(
            "currency must be one of {}",
            CURRENCIES.join(", ")
        )));
    }
    if salary_min.is_some_and(|v| v < 0) || salary_max.is_some_and(|v| v < 0) {
        return Err(Error::BadRequest("salary cannot be negative".to_string()));
    }
    if let (Some(min), Some(max)) = (salary_min, salary_max) {
        if min > max {
            return Err(Error::BadRequest(
                "salary_min cannot exceed salary_max".to_string(),
            ));
        }
    }
    Ok(())
}

impl VacancyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: VacancyListQuery, default_per_page: i64) -> Result<Paginated<Vacancy>> {
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));
        let include_inactive = query.include_inactive.unwrap_or(false);

        let count_sql = format!("SELECT COUNT(*) FROM vacancies WHERE {}", LIST_FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&pattern)
            .bind(query.employer_id)
            .bind(query.settlement_id)
            .bind(query.job_title_id)
            .bind(include_inactive)
            .fetch_one(&self.pool)
            .await?;

        let window = PageWindow::clamp(
            query.page.as_deref(),
            query.per_page.unwrap_or(default_per_page),
            total,
        );

        let list_sql = format!(
            "SELECT * FROM vacancies WHERE {} ORDER BY published_at DESC LIMIT $6 OFFSET $7",
            LIST_FILTER
        );
        let items = sqlx::query_as::<_, Vacancy>(&list_sql)
            .bind(&pattern)
            .bind(query.employer_id)
            .bind(query.settlement_id)
            .bind(query.job_title_id)
            .bind(include_inactive)
            .bind(window.per_page)
            .bind(window.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated::new(items, window))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Vacancy> {
        sqlx::query_as::<_, Vacancy>("SELECT * FROM vacancies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    pub async fn tag_ids(&self, id: Uuid) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT tag_id FROM vacancy_tags WHERE vacancy_id = $1 ORDER BY tag_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Generation of the parent as stored right now.
    async fn parent_generation(
        tx: &mut Transaction<'_, Postgres>,
        parent_id: Option<Uuid>,
    ) -> Result<Option<i32>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let generation = sqlx::query_scalar::<_, i32>("SELECT generation FROM vacancies WHERE id = $1")
            .bind(parent_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| Error::BadRequest("Parent vacancy not found".to_string()))?;
        Ok(Some(generation))
    }

    async fn replace_tags(
        tx: &mut Transaction<'_, Postgres>,
        vacancy_id: Uuid,
        tag_ids: &[i64],
    ) -> Result<()> {
        sqlx::query("DELETE FROM vacancy_tags WHERE vacancy_id = $1")
            .bind(vacancy_id)
            .execute(&mut **tx)
            .await?;
        if !tag_ids.is_empty() {
            sqlx::query(
                "INSERT INTO vacancy_tags (vacancy_id, tag_id) \
                 SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
            )
            .bind(vacancy_id)
            .bind(tag_ids)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    pub async fn create(&self, payload: CreateVacancyPayload) -> Result<Vacancy> {
        let status = parse_status(payload.status.as_deref(), VacancyStatus::Active)?;
        let currency = payload.currency.clone().unwrap_or_else(|| "UAH".to_string());
        check_terms(&currency, payload.salary_min, payload.salary_max)?;

        let mut tx = self.pool.begin().await?;
        let parent_generation = Self::parent_generation(&mut tx, payload.parent_id).await?;
        let rules = SaveRules::apply(status, None, parent_generation, now());

        let vacancy = sqlx::query_as::<_, Vacancy>(
            r#"
            INSERT INTO vacancies (
                employer_id, title, external_id, report_3pn_date, address,
                description, requirements, responsibilities, job_title_id, speciality_id,
                kved_class_id, settlement_id, employment_type_id, education_level_id, degree_id,
                salary_min, salary_max, currency, status, closed_at,
                expires_at, parent_id, generation
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20,
                $21, $22, $23
            )
            RETURNING *
            "#,
        )
        .bind(payload.employer_id)
        .bind(&payload.title)
        .bind(&payload.external_id)
        .bind(payload.report_3pn_date)
        .bind(payload.address.as_deref().unwrap_or_default())
        .bind(&payload.description)
        .bind(payload.requirements.as_deref().unwrap_or_default())
        .bind(payload.responsibilities.as_deref().unwrap_or_default())
        .bind(payload.job_title_id)
        .bind(payload.speciality_id)
        .bind(payload.kved_class_id)
        .bind(payload.settlement_id)
        .bind(payload.employment_type_id)
        .bind(payload.education_level_id)
        .bind(payload.degree_id)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(&currency)
        .bind(status.as_str())
        .bind(rules.closed_at)
        .bind(payload.expires_at)
        .bind(payload.parent_id)
        .bind(rules.generation)
        .fetch_one(&mut *tx)
        .await
        .map_err(reference_error)?;

        Self::replace_tags(&mut tx, vacancy.id, &payload.tag_ids).await?;
        tx.commit().await?;

        tracing::info!("Vacancy {} created (generation {})", vacancy.id, vacancy.generation);
        Ok(vacancy)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateVacancyPayload) -> Result<Vacancy> {
        let current = self.get_by_id(id).await?;
        let current_status = parse_status(Some(current.status.as_str()), VacancyStatus::Active)?;
        let status = parse_status(payload.status.as_deref(), current_status)?;
        let currency = payload.currency.clone().unwrap_or_else(|| current.currency.clone());
        let salary_min = patch(payload.salary_min, current.salary_min);
        let salary_max = patch(payload.salary_max, current.salary_max);
        check_terms(&currency, salary_min, salary_max)?;

        let mut tx = self.pool.begin().await?;
        let parent_generation = Self::parent_generation(&mut tx, current.parent_id).await?;
        let rules = SaveRules::apply(status, current.closed_at, parent_generation, now());

        let vacancy = sqlx::query_as::<_, Vacancy>(
            r#"
            UPDATE vacancies
            SET
                title = $2,
                report_3pn_date = $3,
                address = $4,
                description = $5,
                requirements = $6,
                responsibilities = $7,
                job_title_id = $8,
                speciality_id = $9,
                kved_class_id = $10,
                settlement_id = $11,
                employment_type_id = $12,
                education_level_id = $13,
                degree_id = $14,
                salary_min = $15,
                salary_max = $16,
                currency = $17,
                status = $18,
                is_active = $19,
                expires_at = $20,
                closed_at = $21,
                generation = $22,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.title.unwrap_or(current.title))
        .bind(patch(payload.report_3pn_date, current.report_3pn_date))
        .bind(payload.address.unwrap_or(current.address))
        .bind(payload.description.unwrap_or(current.description))
        .bind(payload.requirements.unwrap_or(current.requirements))
        .bind(payload.responsibilities.unwrap_or(current.responsibilities))
        .bind(payload.job_title_id.unwrap_or(current.job_title_id))
        .bind(patch(payload.speciality_id, current.speciality_id))
        .bind(patch(payload.kved_class_id, current.kved_class_id))
        .bind(payload.settlement_id.unwrap_or(current.settlement_id))
        .bind(payload.employment_type_id.unwrap_or(current.employment_type_id))
        .bind(payload.education_level_id.unwrap_or(current.education_level_id))
        .bind(patch(payload.degree_id, current.degree_id))
        .bind(salary_min)
        .bind(salary_max)
        .bind(&currency)
        .bind(status.as_str())
        .bind(payload.is_active.unwrap_or(current.is_active))
        .bind(patch(payload.expires_at, current.expires_at))
        .bind(rules.closed_at)
        .bind(rules.generation)
        .fetch_one(&mut *tx)
        .await
        .map_err(reference_error)?;

        if let Some(tag_ids) = &payload.tag_ids {
            Self::replace_tags(&mut tx, id, tag_ids).await?;
        }
        tx.commit().await?;

        Ok(vacancy)
    }

    /// New active vacancy with the parent's content, one generation down the
    /// chain.
    pub async fn republish(&self, parent_id: Uuid) -> Result<Vacancy> {
        let mut tx = self.pool.begin().await?;
        let parent_generation = Self::parent_generation(&mut tx, Some(parent_id))
            .await
            .map_err(missing_parent_as_not_found)?;
        let rules = SaveRules::apply(VacancyStatus::Active, None, parent_generation, now());

        let vacancy = sqlx::query_as::<_, Vacancy>(
            r#"
            INSERT INTO vacancies (
                employer_id, title, source_id, report_3pn_date, address,
                description, requirements, responsibilities, job_title_id, speciality_id,
                kved_class_id, settlement_id, employment_type_id, education_level_id, degree_id,
                salary_min, salary_max, currency, status, is_active,
                published_at, closed_at, parent_id, generation
            )
            SELECT
                employer_id, title, source_id, report_3pn_date, address,
                description, requirements, responsibilities, job_title_id, speciality_id,
                kved_class_id, settlement_id, employment_type_id, education_level_id, degree_id,
                salary_min, salary_max, currency, $2, TRUE,
                NOW(), $3, id, $4
            FROM vacancies
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(parent_id)
        .bind(VacancyStatus::Active.as_str())
        .bind(rules.closed_at)
        .bind(rules.generation)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO vacancy_tags (vacancy_id, tag_id) \
             SELECT $1, tag_id FROM vacancy_tags WHERE vacancy_id = $2",
        )
        .bind(vacancy.id)
        .bind(parent_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(
            "Vacancy {} republished as {} (generation {})",
            parent_id,
            vacancy.id,
            vacancy.generation
        );
        Ok(vacancy)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM vacancies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Vacancy not found".to_string()));
        }
        Ok(())
    }
}

/// A republished vacancy that does not exist is a 404, not a bad reference.
fn missing_parent_as_not_found(err: Error) -> Error {
    match err {
        Error::BadRequest(_) => Error::NotFound("Vacancy not found".to_string()),
        other => other,
    }
}

/// `None` keeps the stored value; `Some(None)` clears it.
fn patch<T>(change: Option<Option<T>>, current: Option<T>) -> Option<T> {
    match change {
        Some(value) => value,
        None => current,
    }
}

/// Foreign keys and uniques on vacancies come from the caller's payload.
fn reference_error(err: sqlx::Error) -> Error {
    let err = Error::from(err);
    if err.is_constraint_violation() {
        Error::BadRequest("Vacancy references unknown records or duplicates an external id".to_string())
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_and_rejects_unknown() {
        assert_eq!(
            parse_status(None, VacancyStatus::Active).unwrap(),
            VacancyStatus::Active
        );
        assert_eq!(
            parse_status(Some("filled"), VacancyStatus::Active).unwrap(),
            VacancyStatus::Filled
        );
        assert!(parse_status(Some("draft"), VacancyStatus::Active).is_err());
    }

    #[test]
    fn terms_check_currency_and_salary_order() {
        assert!(check_terms("UAH", Some(100), Some(200)).is_ok());
        assert!(check_terms("EUR", None, Some(200)).is_ok());
        assert!(check_terms("GBP", None, None).is_err());
        assert!(check_terms("USD", Some(300), Some(200)).is_err());
        assert!(check_terms("UAH", Some(-1), None).is_err());
    }

    #[test]
    fn patch_keeps_clears_or_replaces() {
        assert_eq!(patch(None, Some(5)), Some(5));
        assert_eq!(patch(Some(None), Some(5)), None);
        assert_eq!(patch(Some(Some(7)), Some(5)), Some(7));
        assert_eq!(patch(Some(Some(7)), None), Some(7));
    }

    #[test]
    fn only_a_missing_parent_becomes_not_found() {
        let missing = missing_parent_as_not_found(Error::BadRequest("Parent vacancy not found".into()));
        assert!(matches!(missing, Error::NotFound(_)));

        let db = missing_parent_as_not_found(Error::Database(sqlx::Error::PoolTimedOut));
        assert!(matches!(db, Error::Database(_)));
    }
}
