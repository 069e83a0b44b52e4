use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::reference_dto::{ReferenceSearchQuery, SettlementOption},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/reference/settlements",
    params(
        ("q" = Option<String>, Query, description = "Start of the settlement name"),
        ("limit" = Option<i64>, Query, description = "At most 100")
    ),
    responses(
        (status = 200, description = "Settlements with region, district and community")
    )
)]
#[axum::debug_handler]
pub async fn search_settlements(
    State(state): State<AppState>,
    Query(query): Query<ReferenceSearchQuery>,
) -> Result<impl IntoResponse> {
    let items = state.reference_service.settlements(&query).await?;
    Ok(Json(
        items
            .into_iter()
            .map(SettlementOption::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/reference/job-titles",
    params(
        ("q" = Option<String>, Query, description = "KP code prefix or name fragment"),
        ("limit" = Option<i64>, Query, description = "At most 100")
    ),
    responses(
        (status = 200, description = "Matching job titles")
    )
)]
#[axum::debug_handler]
pub async fn search_job_titles(
    State(state): State<AppState>,
    Query(query): Query<ReferenceSearchQuery>,
) -> Result<impl IntoResponse> {
    let items = state.reference_service.job_titles(&query).await?;
    Ok(Json(items))
}
