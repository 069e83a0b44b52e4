use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::employer_dto::EmployerResponse;
use crate::models::resume::{ContactDetails, ContactRequest, Resume};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateResumePayload {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 0))]
    pub expected_salary: Option<i32>,
    pub is_anonymous: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateResumePayload {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub expected_salary: Option<i32>,
    pub is_anonymous: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResumeBrowseQuery {
    pub page: Option<String>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct ContactRequestPayload {
    #[validate(length(max = 2000))]
    pub message: String,
}

/// A resume as one viewer sees it: contacts only when disclosed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub expected_salary: Option<i32>,
    pub is_active: bool,
    pub is_anonymous: bool,
    pub contacts: Option<ContactDetails>,
    pub contact_request_pending: bool,
    pub updated_at: DateTime<Utc>,
}

impl ResumeView {
    pub fn new(resume: Resume, contacts: Option<ContactDetails>, pending: bool) -> Self {
        Self {
            id: resume.id,
            title: resume.title,
            description: resume.description,
            expected_salary: resume.expected_salary,
            is_active: resume.is_active,
            is_anonymous: resume.is_anonymous,
            contacts,
            contact_request_pending: pending,
            updated_at: resume.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequestResponse {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub recruiter_id: Uuid,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContactRequest> for ContactRequestResponse {
    fn from(value: ContactRequest) -> Self {
        Self {
            id: value.id,
            resume_id: value.resume_id,
            recruiter_id: value.recruiter_id,
            message: value.message,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DashboardResponse {
    Candidate {
        resumes: Vec<Resume>,
        pending_requests: Vec<ContactRequestResponse>,
    },
    Recruiter {
        employers: Vec<EmployerResponse>,
        sent_requests: Vec<ContactRequestResponse>,
    },
}
