use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use sqlx::PgPool;

use crate::error::Result;

/// Codes already known per level: the stored ones plus everything planned so
/// far in the current run.
#[derive(Debug, Clone)]
pub struct CodeIndex<L> {
    codes: HashMap<L, HashSet<String>>,
}

impl<L> Default for CodeIndex<L> {
    fn default() -> Self {
        Self {
            codes: HashMap::new(),
        }
    }
}

impl<L: Copy + Eq + Hash> CodeIndex<L> {
    pub fn contains(&self, level: L, code: &str) -> bool {
        self.codes
            .get(&level)
            .map(|codes| codes.contains(code))
            .unwrap_or(false)
    }

    /// Returns false when the code was already known.
    pub fn insert(&mut self, level: L, code: &str) -> bool {
        self.codes
            .entry(level)
            .or_default()
            .insert(code.to_string())
    }

    /// Snapshots the stored codes of every level from its table.
    pub async fn load(
        pool: &PgPool,
        levels: &[L],
        table: impl Fn(L) -> &'static str,
    ) -> Result<Self> {
        let mut index = Self::default();
        for &level in levels {
            let codes = load_codes(pool, table(level)).await?;
            index.codes.insert(level, codes);
        }
        Ok(index)
    }
}

pub async fn load_codes(pool: &PgPool, table: &str) -> Result<HashSet<String>> {
    let sql = format!("SELECT code FROM {}", table);
    let codes: Vec<String> = sqlx::query_scalar(&sql).fetch_all(pool).await?;
    Ok(codes.into_iter().collect())
}
