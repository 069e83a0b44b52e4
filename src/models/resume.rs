use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub is_anonymous: bool,
    pub expected_salary: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContactRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl ContactRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactRequestStatus::Pending => "PENDING",
            ContactRequestStatus::Approved => "APPROVED",
            ContactRequestStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactRequest {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub recruiter_id: Uuid,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Resume owner's contact details, disclosed only when visible.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Whoever is looking at a resume. Unauthenticated requests have no viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub is_staff: bool,
}

/// The request state between a resume and the viewer, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestState {
    pub approved: bool,
    pub pending: bool,
}

pub fn contacts_visible(resume: &Resume, viewer: Option<&Viewer>, requests: RequestState) -> bool {
    if !resume.is_anonymous {
        return true;
    }
    match viewer {
        None => false,
        Some(viewer) => viewer.user_id == resume.user_id || viewer.is_staff || requests.approved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume(owner: Uuid, anonymous: bool) -> Resume {
        Resume {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Бухгалтер".into(),
            description: "10 років досвіду".into(),
            is_active: true,
            is_anonymous: anonymous,
            expected_salary: Some(20000),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn viewer(id: Uuid) -> Viewer {
        Viewer {
            user_id: id,
            is_staff: false,
        }
    }

    #[test]
    fn public_resume_is_visible_to_everyone() {
        let r = resume(Uuid::new_v4(), false);
        assert!(contacts_visible(&r, None, RequestState::default()));
        assert!(contacts_visible(&r, Some(&viewer(Uuid::new_v4())), RequestState::default()));
    }

    #[test]
    fn anonymous_resume_hidden_from_unrelated_recruiter() {
        let r = resume(Uuid::new_v4(), true);
        assert!(!contacts_visible(&r, None, RequestState::default()));
        assert!(!contacts_visible(&r, Some(&viewer(Uuid::new_v4())), RequestState::default()));
        let pending = RequestState {
            approved: false,
            pending: true,
        };
        assert!(!contacts_visible(&r, Some(&viewer(Uuid::new_v4())), pending));
    }

    #[test]
    fn anonymous_resume_visible_to_owner_staff_and_approved() {
        let owner = Uuid::new_v4();
        let r = resume(owner, true);
        assert!(contacts_visible(&r, Some(&viewer(owner)), RequestState::default()));

        let staff = Viewer {
            user_id: Uuid::new_v4(),
            is_staff: true,
        };
        assert!(contacts_visible(&r, Some(&staff), RequestState::default()));

        let approved = RequestState {
            approved: true,
            pending: false,
        };
        assert!(contacts_visible(&r, Some(&viewer(Uuid::new_v4())), approved));
    }
}
