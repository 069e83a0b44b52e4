use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KvedLevel {
    Section,
    Division,
    Group,
    Class,
}

impl KvedLevel {
    pub fn parent(&self) -> Option<KvedLevel> {
        match self {
            KvedLevel::Section => None,
            KvedLevel::Division => Some(KvedLevel::Section),
            KvedLevel::Group => Some(KvedLevel::Division),
            KvedLevel::Class => Some(KvedLevel::Group),
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            KvedLevel::Section => "kved_sections",
            KvedLevel::Division => "kved_divisions",
            KvedLevel::Group => "kved_groups",
            KvedLevel::Class => "kved_classes",
        }
    }
}

impl fmt::Display for KvedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KvedLevel::Section => "sections",
            KvedLevel::Division => "divisions",
            KvedLevel::Group => "groups",
            KvedLevel::Class => "classes",
        };
        f.write_str(label)
    }
}

/// Infers the KVED level from the shape of a code: `A`, `01`, `01.1`, `01.11`.
pub fn classify_level(code: &str) -> Option<KvedLevel> {
    let code = code.trim();
    let mut chars = code.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        return letter.is_ascii_uppercase().then_some(KvedLevel::Section);
    }

    let (head, tail) = match code.split_once('.') {
        Some((head, tail)) => (head, Some(tail)),
        None => (code, None),
    };
    if head.len() != 2 || !head.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match tail {
        None => Some(KvedLevel::Division),
        Some(t) if !t.chars().all(|c| c.is_ascii_digit()) => None,
        Some(t) if t.len() == 1 => Some(KvedLevel::Group),
        Some(t) if t.len() == 2 => Some(KvedLevel::Class),
        Some(_) => None,
    }
}

/// Parent code derived by truncation. Divisions cannot derive their section
/// letter from digits, so they return `None`.
pub fn parent_code(code: &str) -> Option<String> {
    let code = code.trim();
    match classify_level(code)? {
        KvedLevel::Class => Some(code[..code.len() - 1].to_string()),
        KvedLevel::Group => Some(code[..2].to_string()),
        KvedLevel::Division | KvedLevel::Section => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_shape() {
        assert_eq!(classify_level("A"), Some(KvedLevel::Section));
        assert_eq!(classify_level("01"), Some(KvedLevel::Division));
        assert_eq!(classify_level("01.1"), Some(KvedLevel::Group));
        assert_eq!(classify_level("01.11"), Some(KvedLevel::Class));
        assert_eq!(classify_level(" 01.11 "), Some(KvedLevel::Class));
    }

    #[test]
    fn rejects_malformed_codes() {
        assert_eq!(classify_level(""), None);
        assert_eq!(classify_level("a"), None);
        assert_eq!(classify_level("1"), None);
        assert_eq!(classify_level("011"), None);
        assert_eq!(classify_level("01.111"), None);
        assert_eq!(classify_level("01.x"), None);
        assert_eq!(classify_level("AB"), None);
    }

    #[test]
    fn parents_by_truncation() {
        assert_eq!(parent_code("01.11").as_deref(), Some("01.1"));
        assert_eq!(parent_code("01.1").as_deref(), Some("01"));
        assert_eq!(parent_code("01"), None);
        assert_eq!(parent_code("A"), None);
    }
}
