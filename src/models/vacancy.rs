use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VacancyStatus {
    Active,
    Filled,
    Withdrawn,
    Expired,
}

impl VacancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VacancyStatus::Active => "active",
            VacancyStatus::Filled => "filled",
            VacancyStatus::Withdrawn => "withdrawn",
            VacancyStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(VacancyStatus::Active),
            "filled" => Some(VacancyStatus::Filled),
            "withdrawn" => Some(VacancyStatus::Withdrawn),
            "expired" => Some(VacancyStatus::Expired),
            _ => None,
        }
    }
}

pub const CURRENCIES: [&str; 3] = ["UAH", "USD", "EUR"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vacancy {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields derived on every save rather than taken from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRules {
    pub closed_at: Option<DateTime<Utc>>,
    pub generation: i32,
}

impl SaveRules {
    /// `parent_generation` must be read from the stored parent at save time.
    pub fn apply(
        status: VacancyStatus,
        current_closed_at: Option<DateTime<Utc>>,
        parent_generation: Option<i32>,
        now: DateTime<Utc>,
    ) -> Self {
        let closed_at = match status {
            VacancyStatus::Active => None,
            _ => Some(current_closed_at.unwrap_or(now)),
        };
        let generation = parent_generation.map_or(1, |g| g + 1);
        Self {
            closed_at,
            generation,
        }
    }
}

/// Salary pair as read from an import file. A blank minimum takes the maximum;
/// a non-numeric value in either column clears both.
pub fn normalize_salary(min: &str, max: &str) -> (Option<i32>, Option<i32>) {
    fn parse(raw: &str) -> Result<Option<i32>, ()> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<u32>()
            .ok()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or(())
    }

    match (parse(min), parse(max)) {
        (Ok(min), Ok(max)) => (min.or(max), max),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn leaving_active_stamps_closed_at_once() {
        let rules = SaveRules::apply(VacancyStatus::Filled, None, None, at(10));
        assert_eq!(rules.closed_at, Some(at(10)));

        let later = SaveRules::apply(VacancyStatus::Expired, rules.closed_at, None, at(12));
        assert_eq!(later.closed_at, Some(at(10)));
    }

    #[test]
    fn returning_to_active_clears_closed_at() {
        let rules = SaveRules::apply(VacancyStatus::Active, Some(at(9)), None, at(10));
        assert_eq!(rules.closed_at, None);
    }

    #[test]
    fn generation_follows_parent() {
        let a = SaveRules::apply(VacancyStatus::Active, None, None, at(1));
        assert_eq!(a.generation, 1);
        let b = SaveRules::apply(VacancyStatus::Active, None, Some(a.generation), at(2));
        assert_eq!(b.generation, 2);
        let c = SaveRules::apply(VacancyStatus::Active, None, Some(b.generation), at(3));
        assert_eq!(c.generation, 3);
    }

    #[test]
    fn salary_normalization() {
        assert_eq!(normalize_salary("", "15000"), (Some(15000), Some(15000)));
        assert_eq!(normalize_salary("abc", "15000"), (None, None));
        assert_eq!(normalize_salary("12000", "abc"), (None, None));
        assert_eq!(normalize_salary("12000", "15000"), (Some(12000), Some(15000)));
        assert_eq!(normalize_salary("12000", ""), (Some(12000), None));
        assert_eq!(normalize_salary("", ""), (None, None));
        assert_eq!(normalize_salary("-5", "100"), (None, None));
    }

    #[test]
    fn status_round_trip_through_str() {
        for status in [
            VacancyStatus::Active,
            VacancyStatus::Filled,
            VacancyStatus::Withdrawn,
            VacancyStatus::Expired,
        ] {
            assert_eq!(VacancyStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VacancyStatus::parse("draft"), None);
    }
}
