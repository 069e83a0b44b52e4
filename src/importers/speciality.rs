use std::collections::HashSet;
use std::path::Path;

use sqlx::PgPool;

use crate::error::Result;
use crate::importers::index::load_codes;
use crate::importers::report::ImportReport;
use crate::importers::source::Table;
use crate::models::speciality::knowledge_field_code;
use crate::utils::text::{is_digits, split_code_name};

pub const DEFAULT_FILE: &str = "temp/speciality.csv";

pub const KNOWLEDGE_FIELDS: &str = "knowledge fields";
pub const SPECIALITIES: &str = "specialities";

#[derive(Debug, Clone, PartialEq)]
pub enum SpecialityChange {
    KnowledgeField {
        code: String,
        name: String,
        sort_order: i32,
    },
    Speciality {
        code: String,
        name: String,
        field: String,
        sort_order: i32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SpecialityIndex {
    pub fields: HashSet<String>,
    pub specialities: HashSet<String>,
}

impl SpecialityIndex {
    pub async fn load(pool: &PgPool) -> Result<Self> {
        Ok(Self {
            fields: load_codes(pool, "knowledge_fields").await?,
            specialities: load_codes(pool, "specialities").await?,
        })
    }
}

/// Column 0 holds `"01 Name"` for a knowledge field, column 1 `"011 Name"`
/// for a speciality. Either may be blank on a given row.
pub fn plan(
    table: &Table,
    index: &mut SpecialityIndex,
) -> (Vec<SpecialityChange>, ImportReport<&'static str>) {
    let mut report = ImportReport::new();
    let mut changes = Vec::new();

    for row in table.rows() {
        if row.width() < 2 {
            report.ignored += 1;
            continue;
        }

        let field_cell = row.at(0);
        if !field_cell.is_empty() {
            match split_code_name(&field_cell) {
                Some((code, _)) if !is_digits(&code, 2, 2) => {
                    tracing::warn!("Row {}: bad knowledge field code '{}'", row.line(), code);
                    report.errors += 1;
                }
                Some((code, name)) => {
                    if index.fields.insert(code.clone()) {
                        report.record_created(KNOWLEDGE_FIELDS);
                        changes.push(SpecialityChange::KnowledgeField {
                            sort_order: index.fields.len() as i32,
                            code,
                            name,
                        });
                    } else {
                        report.skipped += 1;
                    }
                }
                None => report.ignored += 1,
            }
        }

        let speciality_cell = row.at(1);
        if speciality_cell.is_empty() {
            continue;
        }
        let Some((code, name)) = split_code_name(&speciality_cell) else {
            report.ignored += 1;
            continue;
        };
        if !is_digits(&code, 3, 10) {
            tracing::warn!("Row {}: bad speciality code '{}'", row.line(), code);
            report.errors += 1;
            continue;
        }
        let field = knowledge_field_code(&code).unwrap_or_default().to_string();
        if !index.fields.contains(&field) {
            tracing::warn!(
                "Row {}: KnowledgeField {} not found for Speciality {}. Skipping.",
                row.line(),
                field,
                code
            );
            report.errors += 1;
            continue;
        }
        if !index.specialities.insert(code.clone()) {
            report.skipped += 1;
            continue;
        }
        report.record_created(SPECIALITIES);
        changes.push(SpecialityChange::Speciality {
            sort_order: index.specialities.len() as i32,
            code,
            name,
            field,
        });
    }

    (changes, report)
}

/// All or nothing: any failed write rolls the whole file back.
pub async fn persist(pool: &PgPool, changes: &[SpecialityChange]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for change in changes {
        match change {
            SpecialityChange::KnowledgeField {
                code,
                name,
                sort_order,
            } => {
                sqlx::query(
                    "INSERT INTO knowledge_fields (code, name, sort_order) VALUES ($1, $2, $3) \
                     ON CONFLICT (code) DO NOTHING",
                )
                .bind(code)
                .bind(name)
                .bind(sort_order)
                .execute(&mut *tx)
                .await?;
            }
            SpecialityChange::Speciality {
                code,
                name,
                field,
                sort_order,
            } => {
                sqlx::query(
                    "INSERT INTO specialities (knowledge_field_id, code, name, parent_id, level, sort_order) \
                     SELECT id, $1, $2, NULL, 1, $4 FROM knowledge_fields WHERE code = $3 \
                     ON CONFLICT (code) DO NOTHING",
                )
                .bind(code)
                .bind(name)
                .bind(field)
                .bind(sort_order)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;
    Ok(())
}

pub async fn run(pool: &PgPool, path: &Path) -> Result<ImportReport<&'static str>> {
    let table = Table::open(path)?;
    tracing::info!("Starting import from {}...", path.display());

    let mut index = SpecialityIndex::load(pool).await?;
    let (changes, report) = plan(&table, &mut index);
    persist(pool, &changes).await?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "\
Галузь знань;Спеціальність
01 Освіта/Педагогіка;011 Освітні, педагогічні науки
;012 Дошкільна освіта
12 Інформаційні технології;121 Інженерія програмного забезпечення
;131 Прикладна механіка
";

    fn table() -> Table {
        Table::from_reader(DATA.as_bytes()).unwrap()
    }

    #[test]
    fn fields_come_before_their_specialities() {
        let (changes, report) = plan(&table(), &mut SpecialityIndex::default());

        assert_eq!(report.created(KNOWLEDGE_FIELDS), 2);
        assert_eq!(report.created(SPECIALITIES), 3);
        assert!(matches!(
            &changes[0],
            SpecialityChange::KnowledgeField { code, .. } if code == "01"
        ));
        assert!(matches!(
            &changes[2],
            SpecialityChange::Speciality { code, field, .. } if code == "012" && field == "01"
        ));
    }

    #[test]
    fn speciality_without_field_is_skipped_and_counted() {
        let (changes, report) = plan(&table(), &mut SpecialityIndex::default());
        assert!(!changes.iter().any(|c| matches!(
            c,
            SpecialityChange::Speciality { code, .. } if code == "131"
        )));
        assert_eq!(report.errors, 1);
    }

    #[test]
    fn rerun_creates_nothing() {
        let mut index = SpecialityIndex::default();
        plan(&table(), &mut index);

        let (changes, report) = plan(&table(), &mut index);
        assert!(changes.is_empty());
        assert_eq!(report.skipped, 5);
    }
}
