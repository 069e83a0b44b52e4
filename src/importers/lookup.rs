use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

/// The job title a vacancy row points at by KP code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTitleRef {
    pub id: i64,
    pub name: String,
}

/// Foreign-key resolution for the domain importers.
#[cfg_attr(test, mockall::automock)]
pub trait ReferenceLookup {
    fn employer_id(&self, tax_id: &str) -> Option<Uuid>;
    fn job_title(&self, code: &str) -> Option<JobTitleRef>;
    fn settlement_id(&self, code: &str) -> Option<i64>;
    /// Settlement that contains the city district with this code.
    fn city_district_settlement_id(&self, code: &str) -> Option<i64>;
    fn kved_class_id(&self, code: &str) -> Option<i64>;
    fn education_level_id(&self, name: &str) -> Option<i64>;
    fn degree_id(&self, name: &str) -> Option<i64>;
}

/// Settlement by its own code, or by the code of one of its city districts.
pub fn resolve_location<L: ReferenceLookup + ?Sized>(lookup: &L, code: &str) -> Option<i64> {
    lookup
        .settlement_id(code)
        .or_else(|| lookup.city_district_settlement_id(code))
}

/// In-memory copy of the reference tables, loaded once per import.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    employers: HashMap<String, Uuid>,
    job_titles: HashMap<String, JobTitleRef>,
    settlements: HashMap<String, i64>,
    city_districts: HashMap<String, i64>,
    kved_classes: HashMap<String, i64>,
    education_levels: HashMap<String, i64>,
    degrees: HashMap<String, i64>,
}

impl ReferenceSnapshot {
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let employers: Vec<(String, Uuid)> = sqlx::query_as("SELECT tax_id, id FROM employers")
            .fetch_all(pool)
            .await?;

        // Several job titles share a KP code; the oldest one wins.
        let job_titles: Vec<(String, i64, String)> = sqlx::query_as(
            "SELECT DISTINCT ON (code) code, id, name FROM job_titles ORDER BY code, id",
        )
        .fetch_all(pool)
        .await?;

        let settlements: Vec<(String, i64)> = sqlx::query_as("SELECT code, id FROM settlements")
            .fetch_all(pool)
            .await?;
        let city_districts: Vec<(String, i64)> =
            sqlx::query_as("SELECT code, settlement_id FROM city_districts")
                .fetch_all(pool)
                .await?;
        let kved_classes: Vec<(String, i64)> = sqlx::query_as("SELECT code, id FROM kved_classes")
            .fetch_all(pool)
            .await?;
        let education_levels: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, id FROM education_levels")
                .fetch_all(pool)
                .await?;
        let degrees: Vec<(String, i64)> = sqlx::query_as("SELECT name, id FROM degrees")
            .fetch_all(pool)
            .await?;

        let mut snapshot = Self {
            employers: employers.into_iter().collect(),
            settlements: settlements.into_iter().collect(),
            city_districts: city_districts.into_iter().collect(),
            kved_classes: kved_classes.into_iter().collect(),
            ..Self::default()
        };
        for (code, id, name) in job_titles {
            snapshot = snapshot.with_job_title(&code, id, &name);
        }
        for (name, id) in education_levels {
            snapshot = snapshot.with_education_level(&name, id);
        }
        for (name, id) in degrees {
            snapshot = snapshot.with_degree(&name, id);
        }

        tracing::info!(
            "Reference snapshot: {} employers, {} job title codes, {} settlements",
            snapshot.employers.len(),
            snapshot.job_titles.len(),
            snapshot.settlements.len()
        );
        Ok(snapshot)
    }

    pub fn with_employer(mut self, tax_id: &str, id: Uuid) -> Self {
        self.employers.insert(tax_id.to_string(), id);
        self
    }

    pub fn with_job_title(mut self, code: &str, id: i64, name: &str) -> Self {
        self.job_titles.entry(code.to_string()).or_insert(JobTitleRef {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_settlement(mut self, code: &str, id: i64) -> Self {
        self.settlements.insert(code.to_string(), id);
        self
    }

    pub fn with_city_district(mut self, code: &str, settlement_id: i64) -> Self {
        self.city_districts.insert(code.to_string(), settlement_id);
        self
    }

    pub fn with_kved_class(mut self, code: &str, id: i64) -> Self {
        self.kved_classes.insert(code.to_string(), id);
        self
    }

    pub fn with_education_level(mut self, name: &str, id: i64) -> Self {
        self.education_levels.insert(name.to_lowercase(), id);
        self
    }

    pub fn with_degree(mut self, name: &str, id: i64) -> Self {
        self.degrees.insert(name.to_lowercase(), id);
        self
    }
}

impl ReferenceLookup for ReferenceSnapshot {
    fn employer_id(&self, tax_id: &str) -> Option<Uuid> {
        self.employers.get(tax_id).copied()
    }

    fn job_title(&self, code: &str) -> Option<JobTitleRef> {
        self.job_titles.get(code).cloned()
    }

    fn settlement_id(&self, code: &str) -> Option<i64> {
        self.settlements.get(code).copied()
    }

    fn city_district_settlement_id(&self, code: &str) -> Option<i64> {
        self.city_districts.get(code).copied()
    }

    fn kved_class_id(&self, code: &str) -> Option<i64> {
        self.kved_classes.get(code).copied()
    }

    fn education_level_id(&self, name: &str) -> Option<i64> {
        self.education_levels.get(&name.to_lowercase()).copied()
    }

    fn degree_id(&self, name: &str) -> Option<i64> {
        self.degrees.get(&name.to_lowercase()).copied()
    }
}
