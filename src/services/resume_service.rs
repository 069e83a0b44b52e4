use crate::dto::resume_dto::{CreateResumePayload, ResumeBrowseQuery, ResumeView, UpdateResumePayload};
use crate::error::{Error, Result};
use crate::models::resume::{contacts_visible, ContactDetails, ContactRequestStatus, RequestState, Resume, Viewer};
use crate::utils::pagination::{PageWindow, Paginated};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ResumeService {
    pool: PgPool,
}

fn request_state(status: Option<&str>) -> RequestState {
    RequestState {
        approved: status == Some(ContactRequestStatus::Approved.as_str()),
        pending: status == Some(ContactRequestStatus::Pending.as_str()),
    }
}

impl ResumeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Resume> {
        sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Resume not found".to_string()))
    }

    pub async fn list_own(&self, user_id: Uuid) -> Result<Vec<Resume>> {
        let items = sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn request_state_for(&self, resume_id: Uuid, viewer: Option<&Viewer>) -> Result<RequestState> {
        let Some(viewer) = viewer else {
            return Ok(RequestState::default());
        };
        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM contact_requests WHERE resume_id = $1 AND recruiter_id = $2",
        )
        .bind(resume_id)
        .bind(viewer.user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request_state(status.as_deref()))
    }

    async fn contact_details(&self, user_id: Uuid) -> Result<ContactDetails> {
        let details = sqlx::query_as::<_, ContactDetails>(
            "SELECT full_name, email, phone FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(details)
    }

    /// The resume with contacts filled in only when the viewer may see them.
    pub async fn view(&self, resume: Resume, viewer: Option<&Viewer>) -> Result<ResumeView> {
        let state = self.request_state_for(resume.id, viewer).await?;
        let contacts = if contacts_visible(&resume, viewer, state) {
            Some(self.contact_details(resume.user_id).await?)
        } else {
            None
        };
        Ok(ResumeView::new(resume, contacts, state.pending))
    }

    pub async fn get(&self, id: Uuid, viewer: Option<&Viewer>) -> Result<ResumeView> {
        let resume = self.get_by_id(id).await?;
        self.view(resume, viewer).await
    }

    pub async fn browse(
        &self,
        query: ResumeBrowseQuery,
        viewer: Option<&Viewer>,
        default_per_page: i64,
    ) -> Result<Paginated<ResumeView>> {
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM resumes WHERE is_active AND ($1::text IS NULL OR title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let window = PageWindow::clamp(
            query.page.as_deref(),
            query.per_page.unwrap_or(default_per_page),
            total,
        );

        let resumes = sqlx::query_as::<_, Resume>(
            r#"
            SELECT * FROM resumes
            WHERE is_active AND ($1::text IS NULL OR title ILIKE $1)
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(window.per_page)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(resumes.len());
        for resume in resumes {
            items.push(self.view(resume, viewer).await?);
        }
        Ok(Paginated::new(items, window))
    }

    pub async fn create(&self, user_id: Uuid, payload: CreateResumePayload) -> Result<Resume> {
        let resume = sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (user_id, title, description, expected_salary, is_anonymous, is_active)
            VALUES ($1, $2, $3, $4, COALESCE($5, TRUE), COALESCE($6, TRUE))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.expected_salary)
        .bind(payload.is_anonymous)
        .bind(payload.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(resume)
    }

    async fn ensure_owner(&self, id: Uuid, user_id: Uuid) -> Result<Resume> {
        let resume = self.get_by_id(id).await?;
        if resume.user_id != user_id {
            return Err(Error::Forbidden("Only the owner can change this resume".to_string()));
        }
        Ok(resume)
    }

    pub async fn update(&self, id: Uuid, user_id: Uuid, payload: UpdateResumePayload) -> Result<Resume> {
        self.ensure_owner(id, user_id).await?;
        let resume = sqlx::query_as::<_, Resume>(
            r#"
            UPDATE resumes
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                expected_salary = COALESCE($4, expected_salary),
                is_anonymous = COALESCE($5, is_anonymous),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.expected_salary)
        .bind(payload.is_anonymous)
        .bind(payload.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(resume)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        self.ensure_owner(id, user_id).await?;
        sqlx::query("DELETE FROM resumes WHERE id = $1")
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
    fn request_status_maps_to_state() {
        assert_eq!(request_state(None), RequestState::default());
        assert!(request_state(Some("PENDING")).pending);
        assert!(!request_state(Some("PENDING")).approved);
        assert!(request_state(Some("APPROVED")).approved);
        assert_eq!(request_state(Some("REJECTED")), RequestState::default());
    }
}
