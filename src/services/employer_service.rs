use crate::dto::employer_dto::{CreateEmployerPayload, EmployerListQuery, UpdateEmployerPayload};
use crate::error::{Error, Result};
use crate::models::employer::{is_valid_tax_id, Employer, EMPLOYER_TYPES};
use crate::models::resume::Viewer;
use crate::utils::pagination::{PageWindow, Paginated};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct EmployerService {
    pool: PgPool,
}

fn check_employer_type(value: Option<&str>) -> Result<()> {
    match value {
        Some(kind) if !EMPLOYER_TYPES.contains(&kind) => Err(Error::BadRequest(format!(
            "employer_type must be one of {}",
            EMPLOYER_TYPES.join(", ")
        ))),
        _ => Ok(()),
    }
}

impl EmployerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: EmployerListQuery, default_per_page: i64) -> Result<Paginated<Employer>> {
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM employers WHERE ($1::text IS NULL OR name ILIKE $1 OR brand_name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let window = PageWindow::clamp(
            query.page.as_deref(),
            query.per_page.unwrap_or(default_per_page),
            total,
        );

        let items = sqlx::query_as::<_, Employer>(
            r#"
            SELECT * FROM employers
            WHERE ($1::text IS NULL OR name ILIKE $1 OR brand_name ILIKE $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(window.per_page)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(items, window))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Employer> {
        sqlx::query_as::<_, Employer>("SELECT * FROM employers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Employer not found".to_string()))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Employer>> {
        let items = sqlx::query_as::<_, Employer>(
            r#"
            SELECT e.* FROM employers e
            WHERE e.owner_id = $1
               OR EXISTS (SELECT 1 FROM employer_staff s WHERE s.employer_id = e.id AND s.user_id = $1)
            ORDER BY e.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Owner, staff member of the employer, or a site administrator.
    pub async fn can_manage(&self, employer: &Employer, viewer: &Viewer) -> Result<bool> {
        if viewer.is_staff || employer.owner_id == viewer.user_id {
            return Ok(true);
        }
        let member: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM employer_staff WHERE employer_id = $1 AND user_id = $2)",
        )
        .bind(employer.id)
        .bind(viewer.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(member)
    }

    pub async fn ensure_can_manage(&self, employer_id: Uuid, viewer: &Viewer) -> Result<Employer> {
        let employer = self.get_by_id(employer_id).await?;
        if !self.can_manage(&employer, viewer).await? {
            return Err(Error::Forbidden("Not allowed to manage this employer".to_string()));
        }
        Ok(employer)
    }

    pub async fn create(&self, owner_id: Uuid, payload: CreateEmployerPayload) -> Result<Employer> {
        if !is_valid_tax_id(&payload.tax_id) {
            return Err(Error::BadRequest("tax_id must have 8 or 10 digits".to_string()));
        }
        check_employer_type(payload.employer_type.as_deref())?;

        let result = sqlx::query_as::<_, Employer>(
            r#"
            INSERT INTO employers (
                owner_id, name, brand_name, tax_id, employer_type,
                kved_class_id, settlement_id, description, website, address
            )
            VALUES ($1, $2, $3, $4, COALESCE($5, 'LEGAL'), $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&payload.name)
        .bind(payload.brand_name.as_deref().unwrap_or_default())
        .bind(&payload.tax_id)
        .bind(&payload.employer_type)
        .bind(payload.kved_class_id)
        .bind(payload.settlement_id)
        .bind(payload.description.as_deref().unwrap_or_default())
        .bind(payload.website.as_deref().unwrap_or_default())
        .bind(payload.address.as_deref().unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::from);

        match result {
            Err(e) if e.is_constraint_violation() => Err(Error::BadRequest(
                "Employer with this tax id already exists or a reference is invalid".to_string(),
            )),
            other => other,
        }
    }

    pub async fn update(&self, id: Uuid, viewer: &Viewer, payload: UpdateEmployerPayload) -> Result<Employer> {
        self.ensure_can_manage(id, viewer).await?;
        check_employer_type(payload.employer_type.as_deref())?;

        let employer = sqlx::query_as::<_, Employer>(
            r#"
            UPDATE employers
            SET
                name = COALESCE($2, name),
                brand_name = COALESCE($3, brand_name),
                employer_type = COALESCE($4, employer_type),
                kved_class_id = COALESCE($5, kved_class_id),
                settlement_id = COALESCE($6, settlement_id),
                description = COALESCE($7, description),
                website = COALESCE($8, website),
                address = COALESCE($9, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.brand_name)
        .bind(&payload.employer_type)
        .bind(payload.kved_class_id)
        .bind(payload.settlement_id)
        .bind(&payload.description)
        .bind(&payload.website)
        .bind(&payload.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(employer)
    }

    pub async fn delete(&self, id: Uuid, viewer: &Viewer) -> Result<()> {
        self.ensure_can_manage(id, viewer).await?;
        sqlx::query("DELETE FROM employers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employer_types_are_checked() {
        assert!(check_employer_type(None).is_ok());
        assert!(check_employer_type(Some("FOP")).is_ok());
        assert!(matches!(
            check_employer_type(Some("LLC")),
            Err(Error::BadRequest(_))
        ));
    }
}
