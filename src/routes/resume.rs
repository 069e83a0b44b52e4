use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::resume_dto::{
        ContactRequestPayload, ContactRequestResponse, CreateResumePayload, ResumeBrowseQuery,
        ResumeView, UpdateResumePayload,
    },
    error::Result,
    middleware::auth::{resolve_viewer, Claims, CurrentUser, RecruiterUser},
    models::resume::Viewer,
    AppState,
};

async fn viewer_of(state: &AppState, claims: Option<Extension<Claims>>) -> Result<Option<Viewer>> {
    match claims {
        Some(Extension(claims)) => Ok(Some(resolve_viewer(state, &claims).await?)),
        None => Ok(None),
    }
}

#[utoipa::path(
    get,
    path = "/api/resumes",
    responses(
        (status = 200, description = "Resumes owned by the caller"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn list_own_resumes(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<impl IntoResponse> {
    let resumes = state.resume_service.list_own(claims.user_id()?).await?;
    Ok(Json(resumes))
}

#[utoipa::path(
    get,
    path = "/api/resumes/browse",
    params(
        ("page" = Option<String>, Query, description = "Page number, clamped to the valid range"),
        ("search" = Option<String>, Query, description = "Title fragment")
    ),
    responses(
        (status = 200, description = "Active resumes with contacts where disclosed")
    )
)]
#[axum::debug_handler]
pub async fn browse_resumes(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Query(query): Query<ResumeBrowseQuery>,
) -> Result<impl IntoResponse> {
    let viewer = viewer_of(&state, claims).await?;
    let page = state
        .resume_service
        .browse(query, viewer.as_ref(), state.page_size)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/resumes/{id}",
    params(
        ("id" = Uuid, Path, description = "Resume ID")
    ),
    responses(
        (status = 200, description = "Resume as seen by the caller", body = Json<ResumeView>),
        (status = 404, description = "Resume not found")
    )
)]
#[axum::debug_handler]
pub async fn get_resume(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let viewer = viewer_of(&state, claims).await?;
    let view = state.resume_service.get(id, viewer.as_ref()).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/resumes",
    request_body = CreateResumePayload,
    responses(
        (status = 201, description = "Resume created"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_resume(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(payload): Json<CreateResumePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let resume = state.resume_service.create(claims.user_id()?, payload).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

#[utoipa::path(
    patch,
    path = "/api/resumes/{id}",
    params(
        ("id" = Uuid, Path, description = "Resume ID")
    ),
    request_body = UpdateResumePayload,
    responses(
        (status = 200, description = "Resume updated"),
        (status = 403, description = "Caller does not own the resume"),
        (status = 404, description = "Resume not found")
    )
)]
#[axum::debug_handler]
pub async fn update_resume(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateResumePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let resume = state
        .resume_service
        .update(id, claims.user_id()?, payload)
        .await?;
    Ok(Json(resume))
}

#[utoipa::path(
    delete,
    path = "/api/resumes/{id}",
    params(
        ("id" = Uuid, Path, description = "Resume ID")
    ),
    responses(
        (status = 204, description = "Resume deleted"),
        (status = 403, description = "Caller does not own the resume"),
        (status = 404, description = "Resume not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_resume(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.resume_service.delete(id, claims.user_id()?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/resumes/{id}/request-contact",
    params(
        ("id" = Uuid, Path, description = "Resume ID")
    ),
    request_body = ContactRequestPayload,
    responses(
        (status = 201, description = "Request created", body = Json<ContactRequestResponse>),
        (status = 200, description = "Request already existed", body = Json<ContactRequestResponse>),
        (status = 403, description = "Recruiter access required"),
        (status = 404, description = "Resume not found")
    )
)]
#[axum::debug_handler]
pub async fn request_contact(
    State(state): State<AppState>,
    RecruiterUser(claims): RecruiterUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<ContactRequestPayload>>,
) -> Result<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    let (request, created) = state
        .contact_request_service
        .request(id, claims.user_id()?, &payload.message)
        .await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(ContactRequestResponse::from(request))))
}
