pub mod employer_dto;
pub mod reference_dto;
pub mod resume_dto;
pub mod vacancy_dto;
