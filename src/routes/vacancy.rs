use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::vacancy_dto::{CreateVacancyPayload, UpdateVacancyPayload, VacancyListQuery, VacancyResponse},
    error::Result,
    middleware::auth::{resolve_viewer, RecruiterUser},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/vacancies",
    params(
        ("page" = Option<String>, Query, description = "Page number, clamped to the valid range"),
        ("search" = Option<String>, Query, description = "Title fragment")
    ),
    responses(
        (status = 200, description = "Paginated vacancies, newest first")
    )
)]
#[axum::debug_handler]
pub async fn list_vacancies(
    State(state): State<AppState>,
    Query(query): Query<VacancyListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.vacancy_service.list(query, state.page_size).await?;
    Ok(Json(page.map(VacancyResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/vacancies/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Vacancy details", body = Json<VacancyResponse>),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn get_vacancy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.get_by_id(id).await?;
    let tags = state.vacancy_service.tag_ids(id).await?;
    Ok(Json(VacancyResponse::with_tags(vacancy, tags)))
}

#[utoipa::path(
    post,
    path = "/api/vacancies",
    request_body = CreateVacancyPayload,
    responses(
        (status = 201, description = "Vacancy created successfully", body = Json<VacancyResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller cannot manage the employer")
    )
)]
#[axum::debug_handler]
pub async fn create_vacancy(
    State(state): State<AppState>,
    RecruiterUser(claims): RecruiterUser,
    Json(payload): Json<CreateVacancyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let viewer = resolve_viewer(&state, &claims).await?;
    state
        .employer_service
        .ensure_can_manage(payload.employer_id, &viewer)
        .await?;
    let tags = payload.tag_ids.clone();
    let vacancy = state.vacancy_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(VacancyResponse::with_tags(vacancy, tags))))
}

#[utoipa::path(
    patch,
    path = "/api/vacancies/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    request_body = UpdateVacancyPayload,
    responses(
        (status = 200, description = "Vacancy updated successfully", body = Json<VacancyResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn update_vacancy(
    State(state): State<AppState>,
    RecruiterUser(claims): RecruiterUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVacancyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let viewer = resolve_viewer(&state, &claims).await?;
    let current = state.vacancy_service.get_by_id(id).await?;
    state
        .employer_service
        .ensure_can_manage(current.employer_id, &viewer)
        .await?;
    let vacancy = state.vacancy_service.update(id, payload).await?;
    let tags = state.vacancy_service.tag_ids(id).await?;
    Ok(Json(VacancyResponse::with_tags(vacancy, tags)))
}

#[utoipa::path(
    post,
    path = "/api/vacancies/{id}/republish",
    params(
        ("id" = Uuid, Path, description = "Vacancy to republish")
    ),
    responses(
        (status = 201, description = "New vacancy in the same chain", body = Json<VacancyResponse>),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn republish_vacancy(
    State(state): State<AppState>,
    RecruiterUser(claims): RecruiterUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let viewer = resolve_viewer(&state, &claims).await?;
    let parent = state.vacancy_service.get_by_id(id).await?;
    state
        .employer_service
        .ensure_can_manage(parent.employer_id, &viewer)
        .await?;
    let vacancy = state.vacancy_service.republish(id).await?;
    let tags = state.vacancy_service.tag_ids(vacancy.id).await?;
    Ok((StatusCode::CREATED, Json(VacancyResponse::with_tags(vacancy, tags))))
}

#[utoipa::path(
    delete,
    path = "/api/vacancies/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 204, description = "Vacancy deleted successfully"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_vacancy(
    State(state): State<AppState>,
    RecruiterUser(claims): RecruiterUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let viewer = resolve_viewer(&state, &claims).await?;
    let current = state.vacancy_service.get_by_id(id).await?;
    state
        .employer_service
        .ensure_can_manage(current.employer_id, &viewer)
        .await?;
    state.vacancy_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
