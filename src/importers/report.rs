use std::collections::BTreeMap;
use std::fmt;

/// Outcome of one import run, keyed by the level (or entity) being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport<L: Ord> {
    pub created: BTreeMap<L, usize>,
    pub updated: usize,
    pub skipped: usize,
    pub reclassified: usize,
    pub ambiguous: usize,
    pub unresolved: usize,
    pub ignored: usize,
    pub errors: usize,
}

impl<L: Ord> Default for ImportReport<L> {
    fn default() -> Self {
        Self {
            created: BTreeMap::new(),
            updated: 0,
            skipped: 0,
            reclassified: 0,
            ambiguous: 0,
            unresolved: 0,
            ignored: 0,
            errors: 0,
        }
    }
}

impl<L: Ord + Copy> ImportReport<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self, level: L) {
        *self.created.entry(level).or_default() += 1;
    }

    /// Takes back a planned creation that the database refused.
    pub fn retract_created(&mut self, level: L) {
        if let Some(count) = self.created.get_mut(&level) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn created(&self, level: L) -> usize {
        self.created.get(&level).copied().unwrap_or_default()
    }

    pub fn total_created(&self) -> usize {
        self.created.values().sum()
    }
}

impl<L: Ord + fmt::Display> fmt::Display for ImportReport<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import completed!")?;
        for (level, count) in &self.created {
            writeln!(f, "Created {}: {}", level, count)?;
        }
        if self.updated > 0 {
            writeln!(f, "Updated: {}", self.updated)?;
        }
        if self.reclassified > 0 {
            writeln!(f, "Reclassified as group: {}", self.reclassified)?;
        }
        if self.ambiguous > 0 {
            writeln!(f, "Ambiguous codes: {}", self.ambiguous)?;
        }
        if self.unresolved > 0 {
            writeln!(f, "Stored without a match: {}", self.unresolved)?;
        }
        if self.ignored > 0 {
            writeln!(f, "Ignored rows: {}", self.ignored)?;
        }
        writeln!(f, "Skipped (already present): {}", self.skipped)?;
        write!(f, "Errors: {}", self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_retractions() {
        let mut report = ImportReport::<&'static str>::new();
        report.record_created("regions");
        report.record_created("regions");
        report.record_created("districts");
        report.retract_created("regions");
        report.retract_created("communities");

        assert_eq!(report.created("regions"), 1);
        assert_eq!(report.created("communities"), 0);
        assert_eq!(report.total_created(), 2);
    }

    #[test]
    fn summary_lists_levels_and_hides_empty_extras() {
        let mut report = ImportReport::<&'static str>::new();
        report.record_created("sections");
        report.skipped = 3;
        report.errors = 1;

        let text = report.to_string();
        assert!(text.contains("Created sections: 1"));
        assert!(text.contains("Skipped (already present): 3"));
        assert!(text.ends_with("Errors: 1"));
        assert!(!text.contains("Updated"));
        assert!(!text.contains("Reclassified"));
    }
}
