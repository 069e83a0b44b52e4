use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KnowledgeField {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Speciality {
    pub id: i64,
    pub knowledge_field_id: i64,
    pub code: String,
    pub name: String,
    pub parent_id: Option<i64>,
    pub level: i32,
    pub sort_order: i32,
}

/// Knowledge field code of a speciality: its first two digits.
pub fn knowledge_field_code(speciality_code: &str) -> Option<&str> {
    speciality_code.get(..2)
}
