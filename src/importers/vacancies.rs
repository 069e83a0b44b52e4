use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::importers::dictionaries::{ensure_vacancy_source, first_by_order};
use crate::importers::lookup::{resolve_location, ReferenceLookup, ReferenceSnapshot};
use crate::importers::report::ImportReport;
use crate::importers::source::{Row, Table};
use crate::models::dictionary::Dictionary;
use crate::models::vacancy::normalize_salary;
use crate::utils::time::{parse_export_date, parse_export_datetime};

pub const ENTITY: &str = "vacancies";

/// Values every imported vacancy shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportDefaults {
    pub source_id: i64,
    pub employment_type_id: i64,
    pub education_level_id: Option<i64>,
}

impl ImportDefaults {
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let (source_id, _) = ensure_vacancy_source(pool).await?;
        let employment_type_id = first_by_order(pool, Dictionary::EmploymentType)
            .await?
            .ok_or_else(|| {
                Error::NotFound("No employment types; run load-dictionaries first".to_string())
            })?;
        let education_level_id = first_by_order(pool, Dictionary::EducationLevel).await?;
        Ok(Self {
            source_id,
            employment_type_id,
            education_level_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VacancyUpsert {
    pub external_id: String,
    pub employer_id: Uuid,
    pub title: String,
    pub job_title_id: i64,
    pub settlement_id: i64,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub description: String,
    pub report_3pn_date: Option<NaiveDate>,
    pub published_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub source_id: i64,
    pub employment_type_id: i64,
    pub education_level_id: i64,
    pub degree_id: Option<i64>,
}

/// Why a row cannot become a vacancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    MissingColumns,
    UnknownEmployer(String),
    UnknownJobTitle(String),
    UnknownLocation(String),
    UnknownEducationLevel(String),
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::MissingColumns => f.write_str("not enough data"),
            RowError::UnknownEmployer(tax_id) => write!(f, "employer with tax_id {} not found", tax_id),
            RowError::UnknownJobTitle(code) => write!(f, "job title {} not found", code),
            RowError::UnknownLocation(code) => write!(f, "location {} not found", code),
            RowError::UnknownEducationLevel(name) => write!(f, "education level '{}' not found", name),
        }
    }
}

pub fn plan_row<L: ReferenceLookup + ?Sized>(
    row: &Row<'_>,
    lookup: &L,
    defaults: &ImportDefaults,
    now: DateTime<Utc>,
) -> std::result::Result<VacancyUpsert, RowError> {
    let tax_id = row.get("employer_tax_id");
    let external_id = row.get("external_id");
    let position_code = row.get("position_code");
    let location_code = row.get("location_code");
    if tax_id.is_empty() || external_id.is_empty() || position_code.is_empty() || location_code.is_empty() {
        return Err(RowError::MissingColumns);
    }

    let employer_id = lookup
        .employer_id(&tax_id)
        .ok_or(RowError::UnknownEmployer(tax_id))?;
    let job_title = lookup
        .job_title(&position_code)
        .ok_or(RowError::UnknownJobTitle(position_code))?;
    let settlement_id =
        resolve_location(lookup, &location_code).ok_or(RowError::UnknownLocation(location_code))?;

    let education_name = row.get("education_level");
    let education_level = if education_name.is_empty() {
        defaults.education_level_id
    } else {
        lookup.education_level_id(&education_name)
    };
    let education_level_id =
        education_level.ok_or(RowError::UnknownEducationLevel(education_name))?;

    let degree_name = row.get("degree");
    let degree_id = if degree_name.is_empty() {
        None
    } else {
        lookup.degree_id(&degree_name)
    };

    let (salary_min, salary_max) = normalize_salary(&row.get("salary_min"), &row.get("salary_max"));
    let description = row.get("description");

    Ok(VacancyUpsert {
        external_id,
        employer_id,
        description: if description.is_empty() {
            job_title.name.clone()
        } else {
            description
        },
        title: job_title.name,
        job_title_id: job_title.id,
        settlement_id,
        salary_min,
        salary_max,
        report_3pn_date: parse_export_date(&row.get("report_3pn_date")),
        published_at: parse_export_datetime(&row.get("published_at")).unwrap_or(now),
        confirmed_at: parse_export_datetime(&row.get("confirmed_at")),
        source_id: defaults.source_id,
        employment_type_id: defaults.employment_type_id,
        education_level_id,
        degree_id,
    })
}

pub fn plan<L: ReferenceLookup + ?Sized>(
    table: &Table,
    lookup: &L,
    defaults: &ImportDefaults,
    now: DateTime<Utc>,
    report: &mut ImportReport<&'static str>,
) -> Vec<VacancyUpsert> {
    let mut upserts = Vec::new();
    for row in table.rows() {
        match plan_row(&row, lookup, defaults, now) {
            Ok(vacancy) => upserts.push(vacancy),
            Err(e) => {
                tracing::warn!("Line {}: {}, skipped", row.line(), e);
                report.errors += 1;
            }
        }
    }
    upserts
}

async fn upsert(pool: &PgPool, vacancy: &VacancyUpsert) -> Result<bool> {
    let inserted = sqlx::query_scalar::<_, bool>(
        r#"
        INSERT INTO vacancies (
            external_id, employer_id, title, job_title_id, settlement_id,
            salary_min, salary_max, description, report_3pn_date, published_at,
            confirmed_at, source_id, employment_type_id, education_level_id, degree_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (external_id) DO UPDATE SET
            employer_id = EXCLUDED.employer_id,
            title = EXCLUDED.title,
            job_title_id = EXCLUDED.job_title_id,
            settlement_id = EXCLUDED.settlement_id,
            salary_min = EXCLUDED.salary_min,
            salary_max = EXCLUDED.salary_max,
            description = EXCLUDED.description,
            report_3pn_date = EXCLUDED.report_3pn_date,
            published_at = EXCLUDED.published_at,
            confirmed_at = EXCLUDED.confirmed_at,
            source_id = EXCLUDED.source_id,
            employment_type_id = EXCLUDED.employment_type_id,
            education_level_id = EXCLUDED.education_level_id,
            degree_id = EXCLUDED.degree_id,
            updated_at = NOW()
        RETURNING (xmax = 0)
        "#,
    )
    .bind(&vacancy.external_id)
    .bind(vacancy.employer_id)
    .bind(&vacancy.title)
    .bind(vacancy.job_title_id)
    .bind(vacancy.settlement_id)
    .bind(vacancy.salary_min)
    .bind(vacancy.salary_max)
    .bind(&vacancy.description)
    .bind(vacancy.report_3pn_date)
    .bind(vacancy.published_at)
    .bind(vacancy.confirmed_at)
    .bind(vacancy.source_id)
    .bind(vacancy.employment_type_id)
    .bind(vacancy.education_level_id)
    .bind(vacancy.degree_id)
    .fetch_one(pool)
    .await?;
    Ok(inserted)
}

pub async fn run(pool: &PgPool, path: &Path) -> Result<ImportReport<&'static str>> {
    let table = Table::open(path)?;
    tracing::info!("Importing {} vacancies from {}", table.len(), path.display());

    let defaults = ImportDefaults::load(pool).await?;
    let lookup = ReferenceSnapshot::load(pool).await?;
    let mut report = ImportReport::new();
    let vacancies = plan(&table, &lookup, &defaults, Utc::now(), &mut report);

    for vacancy in &vacancies {
        match upsert(pool, vacancy).await {
            Ok(true) => report.record_created(ENTITY),
            Ok(false) => report.updated += 1,
            Err(e) => {
                if e.is_constraint_violation() {
                    tracing::warn!("Constraint violated by {}: {}", vacancy.external_id, e);
                } else {
                    tracing::error!("Error importing {}: {}", vacancy.external_id, e);
                }
                report.errors += 1;
            }
        }
    }

    Ok(report)
}
