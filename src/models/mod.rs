pub mod dictionary;
pub mod employer;
pub mod kved;
pub mod location;
pub mod occupation;
pub mod resume;
pub mod speciality;
pub mod user;
pub mod vacancy;
