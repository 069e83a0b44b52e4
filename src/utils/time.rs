use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Day-first date format used by the government exports.
pub const EXPORT_DATE_FORMAT: &str = "%d.%m.%Y";

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn parse_export_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, EXPORT_DATE_FORMAT).ok()
}

/// Parses an export date as midnight UTC.
pub fn parse_export_datetime(value: &str) -> Option<DateTime<Utc>> {
    parse_export_date(value)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
