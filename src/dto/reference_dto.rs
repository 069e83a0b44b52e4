use serde::{Deserialize, Serialize};

use crate::models::location::SettlementPath;

pub const DEFAULT_SEARCH_LIMIT: i64 = 20;
pub const MAX_SEARCH_LIMIT: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReferenceSearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

impl ReferenceSearchQuery {
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }
}

/// Search hit with a ready-made display label.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementOption {
    #[serde(flatten)]
    pub path: SettlementPath,
    pub label: String,
}

impl From<SettlementPath> for SettlementOption {
    fn from(path: SettlementPath) -> Self {
        Self {
            label: path.to_string(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_terms_and_limits() {
        let query = ReferenceSearchQuery {
            q: Some("  ".into()),
            limit: Some(1000),
        };
        assert_eq!(query.term(), None);
        assert_eq!(query.limit(), MAX_SEARCH_LIMIT);
        assert_eq!(ReferenceSearchQuery::default().limit(), DEFAULT_SEARCH_LIMIT);
    }
}
