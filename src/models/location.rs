use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Levels of the administrative-territorial classifier, root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    Region,
    District,
    Community,
    Settlement,
    CityDistrict,
}

impl AdminLevel {
    pub const ALL: [AdminLevel; 5] = [
        AdminLevel::Region,
        AdminLevel::District,
        AdminLevel::Community,
        AdminLevel::Settlement,
        AdminLevel::CityDistrict,
    ];

    /// Maps a CATOTTG object category tag to its level.
    pub fn from_category(category: &str) -> Option<Self> {
        match category.trim() {
            "O" | "K" => Some(AdminLevel::Region),
            "P" => Some(AdminLevel::District),
            "H" => Some(AdminLevel::Community),
            "M" | "T" | "C" | "X" => Some(AdminLevel::Settlement),
            "B" => Some(AdminLevel::CityDistrict),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<AdminLevel> {
        match self {
            AdminLevel::Region => None,
            AdminLevel::District => Some(AdminLevel::Region),
            AdminLevel::Community => Some(AdminLevel::District),
            AdminLevel::Settlement => Some(AdminLevel::Community),
            AdminLevel::CityDistrict => Some(AdminLevel::Settlement),
        }
    }

    /// Zero-based index of the code column holding this level's own code.
    pub fn column(&self) -> usize {
        match self {
            AdminLevel::Region => 0,
            AdminLevel::District => 1,
            AdminLevel::Community => 2,
            AdminLevel::Settlement => 3,
            AdminLevel::CityDistrict => 4,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            AdminLevel::Region => "regions",
            AdminLevel::District => "districts",
            AdminLevel::Community => "communities",
            AdminLevel::Settlement => "settlements",
            AdminLevel::CityDistrict => "city_districts",
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdminLevel::Region => "regions",
            AdminLevel::District => "districts",
            AdminLevel::Community => "communities",
            AdminLevel::Settlement => "settlements",
            AdminLevel::CityDistrict => "city districts",
        };
        f.write_str(label)
    }
}

/// Settlement joined with its ancestors, for display and search results.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SettlementPath {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub category: String,
    pub community: String,
    pub district: String,
    pub region: String,
}

impl fmt::Display for SettlementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}), {} обл., {} р-н",
            self.name,
            settlement_category_label(&self.category),
            self.region,
            self.district
        )
    }
}

pub fn settlement_category_label(category: &str) -> &'static str {
    match category {
        "M" => "Місто",
        "T" => "Селище міського типу",
        "X" => "Селище",
        "C" => "Село",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_levels() {
        assert_eq!(AdminLevel::from_category("O"), Some(AdminLevel::Region));
        assert_eq!(AdminLevel::from_category("K"), Some(AdminLevel::Region));
        assert_eq!(AdminLevel::from_category("P"), Some(AdminLevel::District));
        assert_eq!(AdminLevel::from_category("H"), Some(AdminLevel::Community));
        for tag in ["M", "T", "C", "X"] {
            assert_eq!(AdminLevel::from_category(tag), Some(AdminLevel::Settlement));
        }
        assert_eq!(AdminLevel::from_category("B"), Some(AdminLevel::CityDistrict));
        assert_eq!(AdminLevel::from_category("Z"), None);
    }

    #[test]
    fn every_level_but_region_has_a_parent_one_column_left() {
        for level in AdminLevel::ALL {
            match level.parent() {
                Some(parent) => assert_eq!(parent.column() + 1, level.column()),
                None => assert_eq!(level, AdminLevel::Region),
            }
        }
    }
}
