//! Batch loaders for the classifier exports and CSV importers for domain
//! records. Each loader parses a file, plans against a snapshot of what is
//! stored, then writes the plan.

pub mod catottg;
pub mod cleanup;
pub mod dictionaries;
pub mod employers;
pub mod index;
pub mod job_titles;
pub mod kp;
pub mod kved;
pub mod lookup;
pub mod report;
pub mod source;
pub mod speciality;
pub mod vacancies;

pub use report::ImportReport;
pub use source::Table;
