use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::employer::Employer;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEmployerPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub brand_name: Option<String>,
    #[validate(length(min = 8, max = 10))]
    pub tax_id: String,
    pub employer_type: Option<String>,
    pub kved_class_id: Option<i64>,
    pub settlement_id: Option<i64>,
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateEmployerPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub brand_name: Option<String>,
    pub employer_type: Option<String>,
    pub kved_class_id: Option<i64>,
    pub settlement_id: Option<i64>,
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmployerListQuery {
    pub page: Option<String>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub brand_name: String,
    pub display_name: String,
    pub tax_id: String,
    pub employer_type: String,
    pub kved_class_id: Option<i64>,
    pub settlement_id: Option<i64>,
    pub description: String,
    pub website: String,
    pub address: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Employer> for EmployerResponse {
    fn from(value: Employer) -> Self {
        Self {
            display_name: value.display_name().to_string(),
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            brand_name: value.brand_name,
            tax_id: value.tax_id,
            employer_type: value.employer_type,
            kved_class_id: value.kved_class_id,
            settlement_id: value.settlement_id,
            description: value.description,
            website: value.website,
            address: value.address,
            is_verified: value.is_verified,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
