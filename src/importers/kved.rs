use std::path::Path;

use sqlx::PgPool;

use crate::error::Result;
use crate::importers::index::CodeIndex;
use crate::importers::report::ImportReport;
use crate::importers::source::Table;
use crate::models::kved::{self, KvedLevel};

pub const DEFAULT_FILE: &str = "temp/dc_009_2010_1.csv";

const LEVEL_COLUMNS: [(KvedLevel, &str); 4] = [
    (KvedLevel::Section, "Код секції"),
    (KvedLevel::Division, "Код розділу"),
    (KvedLevel::Group, "Код групи"),
    (KvedLevel::Class, "Код класу"),
];
const CODE_COLUMN: &str = "Код";
const NAME_COLUMN: &str = "Назва";

#[derive(Debug, Clone, PartialEq)]
pub struct KvedRow {
    pub line: u64,
    pub level: KvedLevel,
    pub code: String,
    pub parent_code: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub level: KvedLevel,
    pub code: String,
    pub name: String,
    pub parent_code: Option<String>,
}

/// Reads either the per-level column layout or a single code column. In the
/// single-column layout a division belongs to the last section seen above it.
pub fn parse(table: &Table, report: &mut ImportReport<KvedLevel>) -> Vec<KvedRow> {
    let per_level = table.has_column(LEVEL_COLUMNS[0].1);
    let mut current_section: Option<String> = None;
    let mut rows = Vec::new();

    for row in table.rows() {
        let name = row.get(NAME_COLUMN);
        let parsed = if per_level {
            let cells: Vec<(KvedLevel, String)> = LEVEL_COLUMNS
                .iter()
                .map(|(level, column)| (*level, row.get(column)))
                .collect();
            let deepest = cells.iter().rposition(|(_, code)| !code.is_empty());
            deepest.map(|idx| {
                let (level, code) = cells[idx].clone();
                let parent_code = idx
                    .checked_sub(1)
                    .map(|p| cells[p].1.clone())
                    .filter(|code| !code.is_empty())
                    .or_else(|| kved::parent_code(&code));
                (level, code, parent_code)
            })
        } else {
            let code = row.get(CODE_COLUMN);
            kved::classify_level(&code).map(|level| {
                let parent_code = match level {
                    KvedLevel::Section => {
                        current_section = Some(code.clone());
                        None
                    }
                    KvedLevel::Division => current_section.clone(),
                    _ => kved::parent_code(&code),
                };
                (level, code, parent_code)
            })
        };

        match parsed {
            Some((level, code, parent_code)) => rows.push(KvedRow {
                line: row.line(),
                level,
                code,
                parent_code,
                name,
            }),
            None => {
                tracing::debug!("Line {}: no KVED code", row.line());
                report.ignored += 1;
            }
        }
    }

    rows
}

/// Single pass in file order; the official export lists parents first.
pub fn plan(
    rows: &[KvedRow],
    index: &mut CodeIndex<KvedLevel>,
    report: &mut ImportReport<KvedLevel>,
) -> Vec<NewEntry> {
    let mut entries = Vec::new();

    for row in rows {
        if kved::classify_level(&row.code) != Some(row.level) {
            tracing::warn!(
                "Line {}: code '{}' does not look like a KVED {} code",
                row.line,
                row.code,
                row.level
            );
            report.errors += 1;
            continue;
        }

        if index.contains(row.level, &row.code) {
            report.skipped += 1;
            continue;
        }

        if let Some(parent) = row.level.parent() {
            let known = row
                .parent_code
                .as_deref()
                .map(|code| index.contains(parent, code))
                .unwrap_or(false);
            if !known {
                tracing::warn!(
                    "Parent {} '{}' not found for {} {}",
                    parent,
                    row.parent_code.as_deref().unwrap_or_default(),
                    row.level,
                    row.code
                );
                report.errors += 1;
                continue;
            }
        }

        index.insert(row.level, &row.code);
        report.record_created(row.level);
        entries.push(NewEntry {
            level: row.level,
            code: row.code.clone(),
            name: row.name.clone(),
            parent_code: row.parent_code.clone(),
        });
    }

    entries
}

async fn insert_entry(pool: &PgPool, entry: &NewEntry) -> Result<u64> {
    let result = match entry.level.parent() {
        None => {
            let sql = format!(
                "INSERT INTO {} (code, name) VALUES ($1, $2) ON CONFLICT (code) DO NOTHING",
                entry.level.table()
            );
            sqlx::query(&sql)
                .bind(&entry.code)
                .bind(&entry.name)
                .execute(pool)
                .await?
        }
        Some(parent) => {
            let sql = format!(
                "INSERT INTO {table} (code, name, {fk}) \
                 SELECT $1, $2, id FROM {parent} WHERE code = $3 \
                 ON CONFLICT (code) DO NOTHING",
                table = entry.level.table(),
                fk = parent_column(parent),
                parent = parent.table()
            );
            sqlx::query(&sql)
                .bind(&entry.code)
                .bind(&entry.name)
                .bind(entry.parent_code.as_deref().unwrap_or_default())
                .execute(pool)
                .await?
        }
    };
    Ok(result.rows_affected())
}

fn parent_column(level: KvedLevel) -> &'static str {
    match level {
        KvedLevel::Section => "section_id",
        KvedLevel::Division => "division_id",
        KvedLevel::Group => "group_id",
        KvedLevel::Class => "class_id",
    }
}

pub async fn persist(pool: &PgPool, entries: &[NewEntry], report: &mut ImportReport<KvedLevel>) {
    let total = entries.len();
    for (idx, entry) in entries.iter().enumerate() {
        if (idx + 1) % 100 == 0 {
            tracing::info!("Processing row {}/{}...", idx + 1, total);
        }
        let outcome = insert_entry(pool, entry).await;
        if !matches!(outcome, Ok(1)) {
            if let Err(e) = &outcome {
                tracing::error!("Error storing {} {}: {}", entry.level, entry.code, e);
            }
            report.retract_created(entry.level);
            report.errors += 1;
        }
    }
}

pub async fn run(pool: &PgPool, path: &Path) -> Result<ImportReport<KvedLevel>> {
    let table = Table::open(path)?;
    tracing::info!("Loading {} KVED rows from {}", table.len(), path.display());

    let mut report = ImportReport::new();
    let rows = parse(&table, &mut report);
    let levels = LEVEL_COLUMNS.map(|(level, _)| level);
    let mut index = CodeIndex::load(pool, &levels, |level| level.table()).await?;
    let entries = plan(&rows, &mut index, &mut report);
    persist(pool, &entries, &mut report).await;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PER_LEVEL: &str = "\
\"Код секції\";\"Код розділу\";\"Код групи\";\"Код класу\";\"Назва\"
A;;;;Сільське господарство
A;01;;;Рослинництво та тваринництво
A;01;01.1;;Вирощування однорічних культур
A;01;01.1;01.11;Вирощування зернових культур
";

    fn load(data: &str) -> (Vec<KvedRow>, ImportReport<KvedLevel>) {
        let mut report = ImportReport::new();
        let rows = parse(&Table::from_reader(data.as_bytes()).unwrap(), &mut report);
        (rows, report)
    }

    #[test]
    fn deepest_filled_column_picks_the_level() {
        let (rows, _) = load(PER_LEVEL);
        let levels: Vec<_> = rows.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                KvedLevel::Section,
                KvedLevel::Division,
                KvedLevel::Group,
                KvedLevel::Class
            ]
        );
        assert_eq!(rows[1].parent_code.as_deref(), Some("A"));
        assert_eq!(rows[3].parent_code.as_deref(), Some("01.1"));
    }

    #[test]
    fn plans_full_chain_then_skips_on_rerun() {
        let (rows, mut report) = load(PER_LEVEL);
        let mut index = CodeIndex::default();

        let entries = plan(&rows, &mut index, &mut report);
        assert_eq!(entries.len(), 4);
        assert_eq!(report.created(KvedLevel::Class), 1);

        let mut rerun = ImportReport::new();
        assert!(plan(&rows, &mut index, &mut rerun).is_empty());
        assert_eq!(rerun.skipped, 4);
    }

    #[test]
    fn single_code_column_uses_code_shape() {
        let data = "Код;Назва\nA;Сільське господарство\n01;Рослинництво\n01.1;Однорічні\n01.11;Зернові\nзаголовок;\n";
        let (rows, report) = load(data);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].parent_code.as_deref(), Some("A"));
        assert_eq!(rows[2].parent_code.as_deref(), Some("01"));
        assert_eq!(report.ignored, 1);
    }

    #[test]
    fn orphan_group_is_an_error() {
        let data = "Код;Назва\n02.1;Лісівництво\n";
        let (rows, mut report) = load(data);
        let entries = plan(&rows, &mut CodeIndex::default(), &mut report);
        assert!(entries.is_empty());
        assert_eq!(report.errors, 1);
    }
}
