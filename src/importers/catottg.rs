use std::path::Path;

use sqlx::PgPool;

use crate::error::Result;
use crate::importers::index::CodeIndex;
use crate::importers::report::ImportReport;
use crate::importers::source::{Row, Table};
use crate::models::location::AdminLevel;

pub const DEFAULT_FILE: &str = "temp/kodifikator.csv";

const LEVEL_COLUMNS: [&str; 5] = [
    "Перший рівень",
    "Другий рівень",
    "Третій рівень",
    "Четвертий рівень",
    "Додатковий рівень",
];
const CATEGORY_COLUMN: &str = "Категорія об'єкта";
const NAME_COLUMN: &str = "Назва об'єкта";
const LATITUDE_COLUMN: &str = "Широта";
const LONGITUDE_COLUMN: &str = "Довгота";

#[derive(Debug, Clone)]
pub struct UnitRow {
    pub line: u64,
    pub category: String,
    pub codes: [String; 5],
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl UnitRow {
    fn from_row(row: &Row<'_>) -> Self {
        Self {
            line: row.line(),
            category: row.get(CATEGORY_COLUMN),
            codes: LEVEL_COLUMNS.map(|column| row.get(column)),
            name: row.get(NAME_COLUMN),
            latitude: row.get(LATITUDE_COLUMN).replace(',', ".").parse().ok(),
            longitude: row.get(LONGITUDE_COLUMN).replace(',', ".").parse().ok(),
        }
    }

    pub fn level(&self) -> Option<AdminLevel> {
        AdminLevel::from_category(&self.category)
    }

    fn code(&self, level: AdminLevel) -> &str {
        &self.codes[level.column()]
    }
}

/// A unit the database does not know yet, with the code of its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUnit {
    pub level: AdminLevel,
    pub code: String,
    pub name: String,
    pub parent_code: Option<String>,
    pub category: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub fn parse(table: &Table) -> Vec<UnitRow> {
    table.rows().map(|row| UnitRow::from_row(&row)).collect()
}

/// Plans one full pass per level, root first, so a child row may appear
/// anywhere in the file relative to its parent.
pub fn plan(
    rows: &[UnitRow],
    index: &mut CodeIndex<AdminLevel>,
) -> (Vec<NewUnit>, ImportReport<AdminLevel>) {
    let mut report = ImportReport::new();
    let mut units = Vec::new();

    report.ignored = rows.iter().filter(|row| row.level().is_none()).count();

    for level in AdminLevel::ALL {
        for row in rows.iter().filter(|row| row.level() == Some(level)) {
            let code = row.code(level);
            if code.is_empty() || row.name.is_empty() {
                tracing::warn!(
                    "Line {}: {} row without code or name",
                    row.line,
                    row.category
                );
                report.errors += 1;
                continue;
            }

            if index.contains(level, code) {
                report.skipped += 1;
                continue;
            }

            let parent_code = match level.parent() {
                Some(parent) => {
                    let parent_code = row.code(parent);
                    if !index.contains(parent, parent_code) {
                        tracing::warn!(
                            "Line {}: parent {} '{}' not found for {} ({})",
                            row.line,
                            parent,
                            parent_code,
                            row.name,
                            code
                        );
                        report.errors += 1;
                        continue;
                    }
                    Some(parent_code.to_string())
                }
                None => None,
            };

            index.insert(level, code);
            report.record_created(level);
            units.push(NewUnit {
                level,
                code: code.to_string(),
                name: row.name.clone(),
                parent_code,
                category: row.category.clone(),
                latitude: row.latitude,
                longitude: row.longitude,
            });
        }
        tracing::info!("Planned {} {}", report.created(level), level);
    }

    (units, report)
}

async fn insert_unit(pool: &PgPool, unit: &NewUnit) -> Result<u64> {
    let parent = unit.parent_code.as_deref().unwrap_or_default();
    let result = match unit.level {
        AdminLevel::Region => {
            sqlx::query(
                "INSERT INTO regions (code, name, category) VALUES ($1, $2, $3) \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(&unit.code)
            .bind(&unit.name)
            .bind(&unit.category)
            .execute(pool)
            .await?
        }
        AdminLevel::District => {
            sqlx::query(
                "INSERT INTO districts (code, name, region_id) \
                 SELECT $1, $2, id FROM regions WHERE code = $3 \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(&unit.code)
            .bind(&unit.name)
            .bind(parent)
            .execute(pool)
            .await?
        }
        AdminLevel::Community => {
            sqlx::query(
                "INSERT INTO communities (code, name, district_id) \
                 SELECT $1, $2, id FROM districts WHERE code = $3 \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(&unit.code)
            .bind(&unit.name)
            .bind(parent)
            .execute(pool)
            .await?
        }
        AdminLevel::Settlement => {
            sqlx::query(
                "INSERT INTO settlements (code, name, community_id, category, latitude, longitude) \
                 SELECT $1, $2, id, $4, $5, $6 FROM communities WHERE code = $3 \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(&unit.code)
            .bind(&unit.name)
            .bind(parent)
            .bind(&unit.category)
            .bind(unit.latitude)
            .bind(unit.longitude)
            .execute(pool)
            .await?
        }
        AdminLevel::CityDistrict => {
            sqlx::query(
                "INSERT INTO city_districts (code, name, settlement_id) \
                 SELECT $1, $2, id FROM settlements WHERE code = $3 \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(&unit.code)
            .bind(&unit.name)
            .bind(parent)
            .execute(pool)
            .await?
        }
    };
    Ok(result.rows_affected())
}

/// Writes planned units row by row. A failed row is logged and counted, and
/// the run carries on.
pub async fn persist(pool: &PgPool, units: &[NewUnit], report: &mut ImportReport<AdminLevel>) {
    for unit in units {
        match insert_unit(pool, unit).await {
            Ok(1) => {}
            Ok(_) => {
                tracing::warn!("{} {} was not stored", unit.level, unit.code);
                report.retract_created(unit.level);
                report.errors += 1;
            }
            Err(e) => {
                tracing::warn!("Error storing {} ({}): {}", unit.name, unit.code, e);
                report.retract_created(unit.level);
                report.errors += 1;
            }
        }
    }
}

pub async fn run(pool: &PgPool, path: &Path) -> Result<ImportReport<AdminLevel>> {
    let table = Table::open(path)?;
    tracing::info!("Loading {} CATOTTG rows from {}", table.len(), path.display());

    let rows = parse(&table);
    let mut index = CodeIndex::load(pool, &AdminLevel::ALL, |level| level.table()).await?;
    let (units, mut report) = plan(&rows, &mut index);
    persist(pool, &units, &mut report).await;

    Ok(report)
}
