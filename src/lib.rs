pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod importers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    contact_request_service::ContactRequestService, employer_service::EmployerService,
    reference_service::ReferenceService, resume_service::ResumeService,
    vacancy_service::VacancyService,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_secret: Arc<str>,
    pub page_size: i64,
    pub employer_service: EmployerService,
    pub vacancy_service: VacancyService,
    pub resume_service: ResumeService,
    pub contact_request_service: ContactRequestService,
    pub reference_service: ReferenceService,
}

impl AppState {
    pub fn new(pool: PgPool, jwt_secret: &str, page_size: i64) -> Self {
        Self {
            employer_service: EmployerService::new(pool.clone()),
            vacancy_service: VacancyService::new(pool.clone()),
            resume_service: ResumeService::new(pool.clone()),
            contact_request_service: ContactRequestService::new(pool.clone()),
            reference_service: ReferenceService::new(pool.clone()),
            pool,
            jwt_secret: Arc::from(jwt_secret),
            page_size,
        }
    }
}
