use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::{
        employer_dto::EmployerResponse,
        resume_dto::{ContactRequestResponse, DashboardResponse},
    },
    error::Result,
    middleware::auth::CurrentUser,
    AppState,
};

/// Candidates see their resumes and the requests awaiting an answer;
/// recruiters see their employers and the requests they sent.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard for the caller's role"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let body = if claims.is_recruiter() {
        let employers = state.employer_service.list_for_user(user_id).await?;
        let sent = state.contact_request_service.sent_by(user_id).await?;
        DashboardResponse::Recruiter {
            employers: employers.into_iter().map(EmployerResponse::from).collect(),
            sent_requests: sent.into_iter().map(ContactRequestResponse::from).collect(),
        }
    } else {
        let resumes = state.resume_service.list_own(user_id).await?;
        let pending = state.contact_request_service.pending_for_owner(user_id).await?;
        DashboardResponse::Candidate {
            resumes,
            pending_requests: pending.into_iter().map(ContactRequestResponse::from).collect(),
        }
    };
    Ok(Json(body))
}
