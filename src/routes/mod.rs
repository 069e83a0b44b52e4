pub mod contact_request;
pub mod dashboard;
pub mod employer;
pub mod health;
pub mod reference;
pub mod resume;
pub mod vacancy;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::CONFIG;
use crate::middleware::{auth, cors::cors_layer};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let origins = CONFIG
        .get()
        .map(|c| c.cors_allowed_origins.clone())
        .unwrap_or_default();
    let base_routes = Router::new().route("/health", get(health::health));

    // Handlers decide per method whether claims are required.
    let api = Router::new()
        .route(
            "/api/employers",
            get(employer::list_employers).post(employer::create_employer),
        )
        .route(
            "/api/employers/:id",
            get(employer::get_employer)
                .patch(employer::update_employer)
                .delete(employer::delete_employer),
        )
        .route(
            "/api/vacancies",
            get(vacancy::list_vacancies).post(vacancy::create_vacancy),
        )
        .route(
            "/api/vacancies/:id",
            get(vacancy::get_vacancy)
                .patch(vacancy::update_vacancy)
                .delete(vacancy::delete_vacancy),
        )
        .route(
            "/api/vacancies/:id/republish",
            post(vacancy::republish_vacancy),
        )
        .route(
            "/api/resumes",
            get(resume::list_own_resumes).post(resume::create_resume),
        )
        .route("/api/resumes/browse", get(resume::browse_resumes))
        .route(
            "/api/resumes/:id",
            get(resume::get_resume)
                .patch(resume::update_resume)
                .delete(resume::delete_resume),
        )
        .route(
            "/api/resumes/:id/request-contact",
            post(resume::request_contact),
        )
        .route(
            "/api/reference/settlements",
            get(reference::search_settlements),
        )
        .route(
            "/api/reference/job-titles",
            get(reference::search_job_titles),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::optional_bearer_auth,
        ));

    let protected = Router::new()
        .route("/api/dashboard", get(dashboard::dashboard))
        .route(
            "/api/contact-requests/:id/approve",
            post(contact_request::approve_contact_request),
        )
        .route(
            "/api/contact-requests/:id/reject",
            post(contact_request::reject_contact_request),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_auth,
        ));

    base_routes
        .merge(api)
        .merge(protected)
        .with_state(state)
        .layer(cors_layer(&origins))
        .layer(TraceLayer::new_for_http())
}
