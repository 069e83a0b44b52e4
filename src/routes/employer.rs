use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::employer_dto::{CreateEmployerPayload, EmployerListQuery, EmployerResponse, UpdateEmployerPayload},
    error::Result,
    middleware::auth::{resolve_viewer, CurrentUser, RecruiterUser},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/employers",
    params(
        ("page" = Option<String>, Query, description = "Page number, clamped to the valid range"),
        ("search" = Option<String>, Query, description = "Name or brand fragment")
    ),
    responses(
        (status = 200, description = "Paginated employers")
    )
)]
#[axum::debug_handler]
pub async fn list_employers(
    State(state): State<AppState>,
    Query(query): Query<EmployerListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.employer_service.list(query, state.page_size).await?;
    Ok(Json(page.map(EmployerResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/employers/{id}",
    params(
        ("id" = Uuid, Path, description = "Employer ID")
    ),
    responses(
        (status = 200, description = "Employer details", body = Json<EmployerResponse>),
        (status = 404, description = "Employer not found")
    )
)]
#[axum::debug_handler]
pub async fn get_employer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let employer = state.employer_service.get_by_id(id).await?;
    Ok(Json(EmployerResponse::from(employer)))
}

#[utoipa::path(
    post,
    path = "/api/employers",
    request_body = CreateEmployerPayload,
    responses(
        (status = 201, description = "Employer created", body = Json<EmployerResponse>),
        (status = 400, description = "Invalid payload or duplicate tax id")
    )
)]
#[axum::debug_handler]
pub async fn create_employer(
    State(state): State<AppState>,
    RecruiterUser(claims): RecruiterUser,
    Json(payload): Json<CreateEmployerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let owner_id = claims.user_id()?;
    let employer = state.employer_service.create(owner_id, payload).await?;
    Ok((StatusCode::CREATED, Json(EmployerResponse::from(employer))))
}

#[utoipa::path(
    patch,
    path = "/api/employers/{id}",
    params(
        ("id" = Uuid, Path, description = "Employer ID")
    ),
    request_body = UpdateEmployerPayload,
    responses(
        (status = 200, description = "Employer updated", body = Json<EmployerResponse>),
        (status = 403, description = "Caller cannot manage the employer"),
        (status = 404, description = "Employer not found")
    )
)]
#[axum::debug_handler]
pub async fn update_employer(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let viewer = resolve_viewer(&state, &claims).await?;
    let employer = state.employer_service.update(id, &viewer, payload).await?;
    Ok(Json(EmployerResponse::from(employer)))
}

#[utoipa::path(
    delete,
    path = "/api/employers/{id}",
    params(
        ("id" = Uuid, Path, description = "Employer ID")
    ),
    responses(
        (status = 204, description = "Employer deleted"),
        (status = 403, description = "Caller cannot manage the employer"),
        (status = 404, description = "Employer not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_employer(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let viewer = resolve_viewer(&state, &claims).await?;
    state.employer_service.delete(id, &viewer).await?;
    Ok(StatusCode::NO_CONTENT)
}
