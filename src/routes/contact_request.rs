use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use uuid::Uuid;

use crate::{
    error::Result,
    middleware::auth::{Claims, CurrentUser},
    models::resume::ContactRequestStatus,
    AppState,
};

const DASHBOARD: &str = "/api/dashboard";

async fn decide(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
    status: ContactRequestStatus,
) -> Result<Redirect> {
    state
        .contact_request_service
        .decide(id, claims.user_id()?, status)
        .await?;
    Ok(Redirect::to(DASHBOARD))
}

#[utoipa::path(
    post,
    path = "/api/contact-requests/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Contact request ID")
    ),
    responses(
        (status = 303, description = "Approved, redirects to the dashboard"),
        (status = 403, description = "Caller does not own the resume"),
        (status = 404, description = "Contact request not found")
    )
)]
#[axum::debug_handler]
pub async fn approve_contact_request(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    decide(&state, &claims, id, ContactRequestStatus::Approved).await
}

#[utoipa::path(
    post,
    path = "/api/contact-requests/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Contact request ID")
    ),
    responses(
        (status = 303, description = "Rejected, redirects to the dashboard"),
        (status = 403, description = "Caller does not own the resume"),
        (status = 404, description = "Contact request not found")
    )
)]
#[axum::debug_handler]
pub async fn reject_contact_request(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    decide(&state, &claims, id, ContactRequestStatus::Rejected).await
}
