use std::collections::{HashMap, HashSet};
use std::path::Path;

use sqlx::PgPool;

use crate::error::Result;
use crate::importers::index::{load_codes, CodeIndex};
use crate::importers::report::ImportReport;
use crate::importers::source::Table;
use crate::models::occupation::{self, KpLevel, UnitKind};

pub const DEFAULT_FILE: &str = "temp/classification_of_professions.csv";

const CODE_COLUMN: &str = "Код";
const NAME_COLUMN: &str = "Група професій";

#[derive(Debug, Clone)]
pub struct KpRow {
    pub line: u64,
    pub code: String,
    pub name: String,
}

/// What the loader already knows about the KP tree.
#[derive(Debug, Clone, Default)]
pub struct KpIndex {
    codes: CodeIndex<KpLevel>,
    units: HashMap<String, UnitKind>,
    positions: HashSet<(String, String)>,
}

impl KpIndex {
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let mut index = Self::default();
        for (level, table) in [
            (KpLevel::Section, "kp_sections"),
            (KpLevel::Subsection, "kp_subsections"),
            (KpLevel::Class, "kp_classes"),
        ] {
            for code in load_codes(pool, table).await? {
                index.codes.insert(level, &code);
            }
        }

        let units: Vec<(String, String)> = sqlx::query_as("SELECT code, kind FROM kp_units")
            .fetch_all(pool)
            .await?;
        for (code, kind) in units {
            if let Some(kind) = UnitKind::parse(&kind) {
                index.units.insert(code, kind);
            }
        }

        let positions: Vec<(String, String)> =
            sqlx::query_as("SELECT code, name FROM kp_positions")
                .fetch_all(pool)
                .await?;
        index.positions = positions.into_iter().collect();

        Ok(index)
    }

    pub fn unit_kind(&self, code: &str) -> Option<UnitKind> {
        self.units.get(code).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KpChange {
    Section {
        code: String,
        name: String,
    },
    Subsection {
        code: String,
        name: String,
        section: String,
    },
    Class {
        code: String,
        name: String,
        section: String,
        subsection: Option<String>,
    },
    Unit {
        code: String,
        name: String,
        class: String,
        kind: UnitKind,
    },
    Position {
        code: String,
        name: String,
        unit: String,
    },
    /// A stored subclass that gained positions.
    MarkGroup { code: String },
}

impl KpChange {
    fn level(&self) -> Option<KpLevel> {
        match self {
            KpChange::Section { .. } => Some(KpLevel::Section),
            KpChange::Subsection { .. } => Some(KpLevel::Subsection),
            KpChange::Class { .. } => Some(KpLevel::Class),
            KpChange::Unit { kind, .. } => Some(kind.level()),
            KpChange::Position { .. } => Some(KpLevel::Position),
            KpChange::MarkGroup { .. } => None,
        }
    }

    fn code(&self) -> &str {
        match self {
            KpChange::Section { code, .. }
            | KpChange::Subsection { code, .. }
            | KpChange::Class { code, .. }
            | KpChange::Unit { code, .. }
            | KpChange::Position { code, .. }
            | KpChange::MarkGroup { code } => code,
        }
    }
}

pub fn parse(table: &Table) -> Vec<KpRow> {
    table
        .rows()
        .map(|row| KpRow {
            line: row.line(),
            code: row.get(CODE_COLUMN),
            name: row.get(NAME_COLUMN),
        })
        .collect()
}

/// Pass one creates every non-leaf node in file order. Pass two adds the
/// positions and flags each parent unit as a group.
pub fn plan(rows: &[KpRow], index: &mut KpIndex) -> (Vec<KpChange>, ImportReport<KpLevel>) {
    let mut report = ImportReport::new();
    let mut changes = Vec::new();
    // Units created in this run, by position in `changes`.
    let mut planned_units: HashMap<String, usize> = HashMap::new();

    for row in rows {
        if row.code.is_empty() || row.name.is_empty() {
            report.ignored += 1;
            continue;
        }
        let Some(level) = occupation::classify_level(&row.code) else {
            tracing::debug!("Line {}: '{}' is not a KP code", row.line, row.code);
            report.ignored += 1;
            continue;
        };
        if level == KpLevel::Position {
            continue;
        }

        let change = match plan_node(row, level, index) {
            Ok(Some(change)) => change,
            Ok(None) => {
                report.skipped += 1;
                continue;
            }
            Err(parent) => {
                tracing::warn!(
                    "Parent '{}' not found for {} {}",
                    parent,
                    level,
                    row.code
                );
                report.errors += 1;
                continue;
            }
        };

        if let KpChange::Unit { code, kind, .. } = &change {
            index.units.insert(code.clone(), *kind);
            planned_units.insert(code.clone(), changes.len());
        } else {
            index.codes.insert(level, &row.code);
        }
        if let Some(level) = change.level() {
            report.record_created(level);
        }
        changes.push(change);
    }

    for row in rows {
        if row.code.is_empty()
            || row.name.is_empty()
            || occupation::classify_level(&row.code) != Some(KpLevel::Position)
        {
            continue;
        }
        let Some(unit) = occupation::parent_code(&row.code, KpLevel::Position) else {
            continue;
        };
        let Some(kind) = index.unit_kind(&unit) else {
            tracing::warn!(
                "Parent not found for position {}, parent code: {}",
                row.code,
                unit
            );
            report.errors += 1;
            continue;
        };

        if kind == UnitKind::Subclass {
            index.units.insert(unit.clone(), UnitKind::Group);
            match planned_units.get(&unit) {
                Some(&idx) => {
                    if let KpChange::Unit { kind, .. } = &mut changes[idx] {
                        *kind = UnitKind::Group;
                    }
                    report.retract_created(KpLevel::Subclass);
                    report.record_created(KpLevel::Group);
                }
                None => {
                    changes.push(KpChange::MarkGroup { code: unit.clone() });
                    report.reclassified += 1;
                }
            }
        }

        if !index
            .positions
            .insert((row.code.clone(), row.name.clone()))
        {
            report.skipped += 1;
            continue;
        }
        report.record_created(KpLevel::Position);
        changes.push(KpChange::Position {
            code: row.code.clone(),
            name: row.name.clone(),
            unit,
        });
    }

    (changes, report)
}

/// `Ok(None)` when the node already exists, `Err(parent)` when its parent is
/// unknown.
fn plan_node(
    row: &KpRow,
    level: KpLevel,
    index: &KpIndex,
) -> std::result::Result<Option<KpChange>, String> {
    let code = row.code.clone();
    let name = row.name.clone();
    let exists = match level {
        KpLevel::Subclass | KpLevel::Group => index.units.contains_key(&code),
        _ => index.codes.contains(level, &code),
    };
    if exists {
        return Ok(None);
    }

    let parent = occupation::parent_code(&code, level).unwrap_or_default();
    let change = match level {
        KpLevel::Section => KpChange::Section { code, name },
        KpLevel::Subsection => {
            if !index.codes.contains(KpLevel::Section, &parent) {
                return Err(parent);
            }
            KpChange::Subsection {
                code,
                name,
                section: parent,
            }
        }
        KpLevel::Class => {
            let section = occupation::parent_code(&parent, KpLevel::Subsection)
                .unwrap_or_default();
            if index.codes.contains(KpLevel::Subsection, &parent) {
                KpChange::Class {
                    code,
                    name,
                    section,
                    subsection: Some(parent),
                }
            } else if index.codes.contains(KpLevel::Section, &section) {
                KpChange::Class {
                    code,
                    name,
                    section,
                    subsection: None,
                }
            } else {
                return Err(parent);
            }
        }
        KpLevel::Subclass | KpLevel::Group => {
            if !index.codes.contains(KpLevel::Class, &parent) {
                return Err(parent);
            }
            let kind = if level == KpLevel::Group {
                UnitKind::Group
            } else {
                UnitKind::Subclass
            };
            KpChange::Unit {
                code,
                name,
                class: parent,
                kind,
            }
        }
        KpLevel::Position => return Ok(None),
    };
    Ok(Some(change))
}

async fn apply_change(pool: &PgPool, change: &KpChange) -> Result<u64> {
    let result = match change {
        KpChange::Section { code, name } => {
            sqlx::query(
                "INSERT INTO kp_sections (code, name) VALUES ($1, $2) ON CONFLICT (code) DO NOTHING",
            )
            .bind(code)
            .bind(name)
            .execute(pool)
            .await?
        }
        KpChange::Subsection {
            code,
            name,
            section,
        } => {
            sqlx::query(
                "INSERT INTO kp_subsections (code, name, section_id) \
                 SELECT $1, $2, id FROM kp_sections WHERE code = $3 \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(code)
            .bind(name)
            .bind(section)
            .execute(pool)
            .await?
        }
        KpChange::Class {
            code,
            name,
            section,
            subsection,
        } => {
            sqlx::query(
                "INSERT INTO kp_classes (code, name, section_id, subsection_id) \
                 SELECT $1, $2, s.id, (SELECT id FROM kp_subsections WHERE code = $4) \
                 FROM kp_sections s WHERE s.code = $3 \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(code)
            .bind(name)
            .bind(section)
            .bind(subsection)
            .execute(pool)
            .await?
        }
        KpChange::Unit {
            code,
            name,
            class,
            kind,
        } => {
            sqlx::query(
                "INSERT INTO kp_units (code, name, class_id, kind) \
                 SELECT $1, $2, id, $4 FROM kp_classes WHERE code = $3 \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(code)
            .bind(name)
            .bind(class)
            .bind(kind.as_str())
            .execute(pool)
            .await?
        }
        KpChange::Position { code, name, unit } => {
            sqlx::query(
                "INSERT INTO kp_positions (code, name, unit_id) \
                 SELECT $1, $2, id FROM kp_units WHERE code = $3 \
                 ON CONFLICT (code, name) DO NOTHING",
            )
            .bind(code)
            .bind(name)
            .bind(unit)
            .execute(pool)
            .await?
        }
        KpChange::MarkGroup { code } => {
            sqlx::query("UPDATE kp_units SET kind = 'group' WHERE code = $1 AND kind = 'subclass'")
                .bind(code)
                .execute(pool)
                .await?
        }
    };
    Ok(result.rows_affected())
}

pub async fn persist(pool: &PgPool, changes: &[KpChange], report: &mut ImportReport<KpLevel>) {
    let total = changes.len();
    for (idx, change) in changes.iter().enumerate() {
        if (idx + 1) % 100 == 0 {
            tracing::info!("Processing change {}/{}...", idx + 1, total);
        }
        match (apply_change(pool, change).await, change.level()) {
            (Ok(1), _) | (Ok(_), None) => {}
            (Ok(_), Some(level)) => {
                tracing::warn!("{} {} was not stored", level, change.code());
                report.retract_created(level);
                report.errors += 1;
            }
            (Err(e), level) => {
                tracing::error!("Error processing {}: {}", change.code(), e);
                match level {
                    Some(level) => report.retract_created(level),
                    None => report.reclassified = report.reclassified.saturating_sub(1),
                }
                report.errors += 1;
            }
        }
    }
}

pub async fn run(pool: &PgPool, path: &Path) -> Result<ImportReport<KpLevel>> {
    let table = Table::open(path)?;
    tracing::info!("Found {} KP rows to process in {}", table.len(), path.display());

    let rows = parse(&table);
    let mut index = KpIndex::load(pool).await?;
    let (changes, mut report) = plan(&rows, &mut index);
    persist(pool, &changes, &mut report).await;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[(&str, &str)]) -> Vec<KpRow> {
        lines
            .iter()
            .enumerate()
            .map(|(idx, (code, name))| KpRow {
                line: idx as u64 + 2,
                code: code.to_string(),
                name: name.to_string(),
            })
            .collect()
    }

    fn tree() -> Vec<KpRow> {
        rows(&[
            ("1", "Законодавці"),
            ("11", "Вищі посадові особи"),
            ("112", "Керівники установ"),
            ("1120", "Керівники підприємств"),
            ("1120.1", "Генеральний директор"),
            ("1120.1", "Директор"),
            ("113", "Керівники малих підприємств"),
            ("1130", "Керівники малих підприємств без виробничих підрозділів"),
        ])
    }

    fn units(changes: &[KpChange]) -> Vec<(String, UnitKind)> {
        changes
            .iter()
            .filter_map(|c| match c {
                KpChange::Unit { code, kind, .. } => Some((code.clone(), *kind)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn units_with_positions_become_groups() {
        let (changes, report) = plan(&tree(), &mut KpIndex::default());

        assert_eq!(
            units(&changes),
            vec![
                ("1120".to_string(), UnitKind::Group),
                ("1130".to_string(), UnitKind::Subclass)
            ]
        );
        assert_eq!(report.created(KpLevel::Group), 1);
        assert_eq!(report.created(KpLevel::Subclass), 1);
        assert_eq!(report.created(KpLevel::Position), 2);
        assert_eq!(report.reclassified, 0);
        assert!(!changes
            .iter()
            .any(|c| matches!(c, KpChange::MarkGroup { .. })));
    }

    #[test]
    fn positions_may_precede_their_unit() {
        let mut lines = tree();
        let positions: Vec<KpRow> = lines.drain(4..6).collect();
        lines.splice(0..0, positions);
        let (changes, report) = plan(&lines, &mut KpIndex::default());
        assert_eq!(report.created(KpLevel::Position), 2);
        assert_eq!(units(&changes)[0], ("1120".to_string(), UnitKind::Group));
    }

    #[test]
    fn stored_subclass_is_marked_in_place() {
        let mut index = KpIndex::default();
        plan(&tree()[..4], &mut index);
        assert_eq!(index.unit_kind("1120"), Some(UnitKind::Subclass));

        let (changes, report) = plan(&tree(), &mut index);
        assert!(changes.contains(&KpChange::MarkGroup {
            code: "1120".to_string()
        }));
        assert_eq!(report.reclassified, 1);
        assert_eq!(index.unit_kind("1120"), Some(UnitKind::Group));
        assert!(units(&changes).iter().all(|(code, _)| code != "1120"));
    }

    #[test]
    fn rerun_is_a_no_op() {
        let mut index = KpIndex::default();
        plan(&tree(), &mut index);

        let (changes, report) = plan(&tree(), &mut index);
        assert!(changes.is_empty());
        assert_eq!(report.total_created(), 0);
        assert_eq!(report.skipped, 8);
    }

    #[test]
    fn class_falls_back_to_section_without_subsection() {
        let (changes, _) = plan(&rows(&[("2", "Професіонали"), ("213", "Інформатики")]), &mut KpIndex::default());
        assert_eq!(
            changes[1],
            KpChange::Class {
                code: "213".to_string(),
                name: "Інформатики".to_string(),
                section: "2".to_string(),
                subsection: None,
            }
        );
    }

    #[test]
    fn long_codes_are_groups_under_their_class() {
        let (changes, report) = plan(
            &rows(&[("3", "Фахівці"), ("34", "Інші"), ("343", "Фахівці з права"), ("34321", "Група")]),
            &mut KpIndex::default(),
        );
        assert_eq!(units(&changes), vec![("34321".to_string(), UnitKind::Group)]);
        assert_eq!(report.created(KpLevel::Group), 1);
    }

    #[test]
    fn orphans_are_counted() {
        let (changes, report) = plan(
            &rows(&[("11", "Без секції"), ("9999.1", "Без групи")]),
            &mut KpIndex::default(),
        );
        assert!(changes.is_empty());
        assert_eq!(report.errors, 2);
    }
}
