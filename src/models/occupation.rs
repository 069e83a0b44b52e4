use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Levels of the classification of professions (KP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpLevel {
    Section,
    Subsection,
    Class,
    Subclass,
    Group,
    Position,
}

impl fmt::Display for KpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KpLevel::Section => "sections",
            KpLevel::Subsection => "subsections",
            KpLevel::Class => "classes",
            KpLevel::Subclass => "subclasses",
            KpLevel::Group => "groups",
            KpLevel::Position => "positions",
        };
        f.write_str(label)
    }
}

/// Four-digit KP node. It starts as a subclass and is marked as a group once
/// a position hangs off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Subclass,
    Group,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Subclass => "subclass",
            UnitKind::Group => "group",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "subclass" => Some(UnitKind::Subclass),
            "group" => Some(UnitKind::Group),
            _ => None,
        }
    }

    pub fn level(&self) -> KpLevel {
        match self {
            UnitKind::Subclass => KpLevel::Subclass,
            UnitKind::Group => KpLevel::Group,
        }
    }
}

/// Infers the KP level from the shape of a code.
///
/// A dotted code (`1120.1`) is a position. Otherwise the code must be all
/// digits and its length picks the level: 1 section, 2 subsection, 3 class,
/// 4 subclass, more than 4 group. Anything else is not a KP code.
pub fn classify_level(code: &str) -> Option<KpLevel> {
    let code = code.trim();
    if let Some((head, tail)) = code.split_once('.') {
        let valid = !head.is_empty()
            && !tail.is_empty()
            && head.chars().all(|c| c.is_ascii_digit())
            && tail.chars().all(|c| c.is_ascii_digit());
        return valid.then_some(KpLevel::Position);
    }

    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match code.len() {
        1 => Some(KpLevel::Section),
        2 => Some(KpLevel::Subsection),
        3 => Some(KpLevel::Class),
        4 => Some(KpLevel::Subclass),
        _ => Some(KpLevel::Group),
    }
}

/// Parent code obtained by truncating to the parent level's digit count.
/// Positions hang off the code before the dot.
pub fn parent_code(code: &str, level: KpLevel) -> Option<String> {
    let code = code.trim();
    match level {
        KpLevel::Section => None,
        KpLevel::Subsection => code.get(..1).map(str::to_string),
        KpLevel::Class => code.get(..2).map(str::to_string),
        KpLevel::Subclass | KpLevel::Group => code.get(..3).map(str::to_string),
        KpLevel::Position => code.split_once('.').map(|(head, _)| head.to_string()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobTitle {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub zkpptr_code: Option<String>,
    pub etkd_issue: Option<String>,
    pub dkhp_issue: Option<String>,
    pub position_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub attached_to: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_count_boundaries() {
        assert_eq!(classify_level("1"), Some(KpLevel::Section));
        assert_eq!(classify_level("11"), Some(KpLevel::Subsection));
        assert_eq!(classify_level("111"), Some(KpLevel::Class));
        assert_eq!(classify_level("1110"), Some(KpLevel::Subclass));
        assert_eq!(classify_level("11101"), Some(KpLevel::Group));
        assert_eq!(classify_level("1110.1"), Some(KpLevel::Position));
    }

    #[test]
    fn leading_zeros_count_as_digits() {
        assert_eq!(classify_level("0"), Some(KpLevel::Section));
        assert_eq!(classify_level("01"), Some(KpLevel::Subsection));
        assert_eq!(classify_level("0110"), Some(KpLevel::Subclass));
    }

    #[test]
    fn non_digit_codes_are_rejected() {
        assert_eq!(classify_level(""), None);
        assert_eq!(classify_level("11a"), None);
        assert_eq!(classify_level("1 1"), None);
        assert_eq!(classify_level(".1"), None);
        assert_eq!(classify_level("1120."), None);
        assert_eq!(classify_level("1120.a"), None);
    }

    #[test]
    fn parent_codes_truncate() {
        assert_eq!(parent_code("1", KpLevel::Section), None);
        assert_eq!(parent_code("11", KpLevel::Subsection).as_deref(), Some("1"));
        assert_eq!(parent_code("112", KpLevel::Class).as_deref(), Some("11"));
        assert_eq!(parent_code("1120", KpLevel::Subclass).as_deref(), Some("112"));
        assert_eq!(parent_code("11205", KpLevel::Group).as_deref(), Some("112"));
        assert_eq!(parent_code("1120.1", KpLevel::Position).as_deref(), Some("1120"));
    }
}
