use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vacancy::Vacancy;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVacancyPayload {
    pub employer_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    pub external_id: Option<String>,
    pub report_3pn_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(min = 1))]
    pub description: String,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub job_title_id: i64,
    pub speciality_id: Option<i64>,
    pub kved_class_id: Option<i64>,
    pub settlement_id: i64,
    pub employment_type_id: i64,
    pub education_level_id: i64,
    pub degree_id: Option<i64>,
    #[validate(range(min = 0))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 0))]
    pub salary_max: Option<i32>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateVacancyPayload {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub report_3pn_date: Option<Option<NaiveDate>>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub job_title_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub speciality_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub kved_class_id: Option<Option<i64>>,
    pub settlement_id: Option<i64>,
    pub employment_type_id: Option<i64>,
    pub education_level_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub degree_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary_min: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary_max: Option<Option<i32>>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub tag_ids: Option<Vec<i64>>,
}

/// Tells an explicit `null` (`Some(None)`) apart from an absent field (`None`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VacancyListQuery {
    pub page: Option<String>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub employer_id: Option<Uuid>,
    pub settlement_id: Option<i64>,
    pub job_title_id: Option<i64>,
    pub include_inactive: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyResponse {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub external_id: Option<String>,
    pub source_id: Option<i64>,
    pub report_3pn_date: Option<NaiveDate>,
    pub address: String,
    pub description: String,
    pub requirements: String,
    pub responsibilities: String,
    pub job_title_id: i64,
    pub speciality_id: Option<i64>,
    pub kved_class_id: Option<i64>,
    pub settlement_id: i64,
    pub employment_type_id: i64,
    pub education_level_id: i64,
    pub degree_id: Option<i64>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: String,
    pub status: String,
    pub is_active: bool,
    pub published_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub parent_id: Option<Uuid>,
    pub generation: i32,
    pub tag_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VacancyResponse {
    pub fn with_tags(vacancy: Vacancy, tag_ids: Vec<i64>) -> Self {
        let mut response = Self::from(vacancy);
        response.tag_ids = tag_ids;
        response
    }
}

impl From<Vacancy> for VacancyResponse {
    fn from(value: Vacancy) -> Self {
        Self {
            id: value.id,
            employer_id: value.employer_id,
            title: value.title,
            external_id: value.external_id,
            source_id: value.source_id,
            report_3pn_date: value.report_3pn_date,
            address: value.address,
            description: value.description,
            requirements: value.requirements,
            responsibilities: value.responsibilities,
            job_title_id: value.job_title_id,
            speciality_id: value.speciality_id,
            kved_class_id: value.kved_class_id,
            settlement_id: value.settlement_id,
            employment_type_id: value.employment_type_id,
            education_level_id: value.education_level_id,
            degree_id: value.degree_id,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            currency: value.currency,
            status: value.status,
            is_active: value.is_active,
            published_at: value.published_at,
            confirmed_at: value.confirmed_at,
            closed_at: value.closed_at,
            expires_at: value.expires_at,
            parent_id: value.parent_id,
            generation: value.generation,
            tag_ids: Vec::new(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_clears_and_absent_keeps() {
        let payload: UpdateVacancyPayload =
            serde_json::from_value(json!({"salary_min": null, "degree_id": 4})).unwrap();
        assert_eq!(payload.salary_min, Some(None));
        assert_eq!(payload.degree_id, Some(Some(4)));
        assert_eq!(payload.salary_max, None);
        assert_eq!(payload.expires_at, None);
    }
}
