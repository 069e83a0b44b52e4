use crate::error::{Error, Result};
use crate::models::resume::{ContactRequest, ContactRequestStatus};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ContactRequestService {
    pool: PgPool,
}

impl ContactRequestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// At most one request per (resume, recruiter). A repeated call returns
    /// the stored request and `false`.
    pub async fn request(
        &self,
        resume_id: Uuid,
        recruiter_id: Uuid,
        message: &str,
    ) -> Result<(ContactRequest, bool)> {
        let owner_id: Uuid = sqlx::query_scalar("SELECT user_id FROM resumes WHERE id = $1")
            .bind(resume_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Resume not found".to_string()))?;
        if owner_id == recruiter_id {
            return Err(Error::BadRequest(
                "Cannot request contacts of your own resume".to_string(),
            ));
        }

        let inserted = sqlx::query_as::<_, ContactRequest>(
            r#"
            INSERT INTO contact_requests (resume_id, recruiter_id, message)
            VALUES ($1, $2, $3)
            ON CONFLICT (resume_id, recruiter_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(resume_id)
        .bind(recruiter_id)
        .bind(message)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(request) = inserted {
            tracing::info!("Contact request {} created for resume {}", request.id, resume_id);
            return Ok((request, true));
        }

        let existing = sqlx::query_as::<_, ContactRequest>(
            "SELECT * FROM contact_requests WHERE resume_id = $1 AND recruiter_id = $2",
        )
        .bind(resume_id)
        .bind(recruiter_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((existing, false))
    }

    /// Approve or reject. Only the owner of the requested resume may decide.
    pub async fn decide(
        &self,
        id: Uuid,
        owner_id: Uuid,
        status: ContactRequestStatus,
    ) -> Result<ContactRequest> {
        let resume_owner: Uuid = sqlx::query_scalar(
            r#"
            SELECT r.user_id FROM contact_requests cr
            JOIN resumes r ON r.id = cr.resume_id
            WHERE cr.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Contact request not found".to_string()))?;

        if resume_owner != owner_id {
            return Err(Error::Forbidden(
                "Only the resume owner can answer this request".to_string(),
            ));
        }

        let request = sqlx::query_as::<_, ContactRequest>(
            "UPDATE contact_requests SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Contact request {} set to {}", id, status.as_str());
        Ok(request)
    }

    pub async fn pending_for_owner(&self, owner_id: Uuid) -> Result<Vec<ContactRequest>> {
        let items = sqlx::query_as::<_, ContactRequest>(
            r#"
            SELECT cr.* FROM contact_requests cr
            JOIN resumes r ON r.id = cr.resume_id
            WHERE r.user_id = $1 AND cr.status = $2
            ORDER BY cr.created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(ContactRequestStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn sent_by(&self, recruiter_id: Uuid) -> Result<Vec<ContactRequest>> {
        let items = sqlx::query_as::<_, ContactRequest>(
            "SELECT * FROM contact_requests WHERE recruiter_id = $1 ORDER BY created_at DESC",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
