pub mod contact_request_service;
pub mod employer_service;
pub mod reference_service;
pub mod resume_service;
pub mod vacancy_service;
