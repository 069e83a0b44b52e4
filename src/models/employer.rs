use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::text::is_digits;

pub const EMPLOYER_TYPES: [&str; 3] = ["LEGAL", "FOP", "SELF"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employer {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub brand_name: String,
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

impl Employer {
    pub fn display_name(&self) -> &str {
        if self.brand_name.is_empty() {
            &self.name
        } else {
            &self.brand_name
        }
    }
}

/// EDRPOU codes have 8 digits, individual tax numbers (RNOKPP) have 10.
pub fn is_valid_tax_id(tax_id: &str) -> bool {
    let len = tax_id.len();
    (len == 8 || len == 10) && is_digits(tax_id, 8, 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_id_is_eight_or_ten_digits() {
        assert!(is_valid_tax_id("12345678"));
        assert!(is_valid_tax_id("1234567890"));
        assert!(!is_valid_tax_id("123456789"));
        assert!(!is_valid_tax_id("1234567"));
        assert!(!is_valid_tax_id("12345678ab"));
    }
}
