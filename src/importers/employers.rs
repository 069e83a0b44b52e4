use std::path::Path;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::importers::lookup::{resolve_location, ReferenceLookup, ReferenceSnapshot};
use crate::importers::report::ImportReport;
use crate::importers::source::Table;
use crate::models::employer::is_valid_tax_id;
use crate::models::user::User;

pub const DEFAULT_OWNER_EMAIL: &str = "admin@admin.admin";

pub const ENTITY: &str = "employers";

#[derive(Debug, Clone, PartialEq)]
pub struct EmployerUpsert {
    pub tax_id: String,
    pub name: String,
    pub kved_class_id: Option<i64>,
    pub settlement_id: Option<i64>,
    pub address: String,
}

/// Columns: `tax_id;name;kved_code;settlement_code;address`. KVED and
/// settlement are optional; an unknown code is dropped with a warning.
pub fn plan<L: ReferenceLookup + ?Sized>(
    table: &Table,
    lookup: &L,
    report: &mut ImportReport<&'static str>,
) -> Vec<EmployerUpsert> {
    let mut upserts = Vec::new();

    for row in table.rows() {
        let tax_id = row.get("tax_id");
        let name = row.get("name");
        if tax_id.is_empty() || name.is_empty() {
            tracing::warn!("Line {}: missing tax_id or name", row.line());
            report.errors += 1;
            continue;
        }
        if !is_valid_tax_id(&tax_id) {
            tracing::warn!("Line {}: tax_id '{}' must have 8 or 10 digits", row.line(), tax_id);
            report.errors += 1;
            continue;
        }

        let kved_code = row.get("kved_code");
        let kved_class_id = if kved_code.is_empty() {
            None
        } else {
            let id = lookup.kved_class_id(&kved_code);
            if id.is_none() {
                tracing::warn!("KVED {} not found for {}", kved_code, tax_id);
                report.unresolved += 1;
            }
            id
        };

        let settlement_code = row.get("settlement_code");
        let settlement_id = if settlement_code.is_empty() {
            None
        } else {
            let id = resolve_location(lookup, &settlement_code);
            if id.is_none() {
                tracing::warn!(
                    "Settlement or city district {} not found for {}",
                    settlement_code,
                    tax_id
                );
                report.unresolved += 1;
            }
            id
        };

        upserts.push(EmployerUpsert {
            tax_id,
            name,
            kved_class_id,
            settlement_id,
            address: row.get("address"),
        });
    }

    upserts
}

async fn upsert(pool: &PgPool, owner_id: Uuid, employer: &EmployerUpsert) -> Result<bool> {
    let inserted = sqlx::query_scalar::<_, bool>(
        r#"
        INSERT INTO employers (owner_id, tax_id, name, kved_class_id, settlement_id, address)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (tax_id) DO UPDATE SET
            owner_id = EXCLUDED.owner_id,
            name = EXCLUDED.name,
            kved_class_id = EXCLUDED.kved_class_id,
            settlement_id = EXCLUDED.settlement_id,
            address = EXCLUDED.address,
            updated_at = NOW()
        RETURNING (xmax = 0)
        "#,
    )
    .bind(owner_id)
    .bind(&employer.tax_id)
    .bind(&employer.name)
    .bind(employer.kved_class_id)
    .bind(employer.settlement_id)
    .bind(&employer.address)
    .fetch_one(pool)
    .await?;
    Ok(inserted)
}

pub async fn find_owner(pool: &PgPool, email: &str) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User with email {} not found", email)))
}

pub async fn run(pool: &PgPool, path: &Path, owner_email: &str) -> Result<ImportReport<&'static str>> {
    let table = Table::open(path)?;
    let owner = find_owner(pool, owner_email).await?;
    if !owner.is_recruiter() && !owner.is_staff {
        tracing::warn!("Owner {} is neither a recruiter nor staff", owner_email);
    }
    tracing::info!("Importing {} employers for owner {}", table.len(), owner_email);

    let lookup = ReferenceSnapshot::load(pool).await?;
    let mut report = ImportReport::new();
    let employers = plan(&table, &lookup, &mut report);

    for employer in &employers {
        match upsert(pool, owner.id, employer).await {
            Ok(true) => report.record_created(ENTITY),
            Ok(false) => report.updated += 1,
            Err(e) => {
                tracing::error!("Error importing {}: {}", employer.tax_id, e);
                report.errors += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importers::lookup::MockReferenceLookup;

    const DATA: &str = "\
tax_id;name;kved_code;settlement_code;address
12345678;ТОВ Зерно;01.11;UA01;вул. Шевченка, 1
1234567890;ФОП Іваненко;;UA02;
123;Короткий код;;;
;Без коду;;;
87654321;ТОВ Невідомо;99.99;UA99;
";

    fn lookup() -> MockReferenceLookup {
        let mut lookup = MockReferenceLookup::new();
        lookup
            .expect_kved_class_id()
            .returning(|code| (code == "01.11").then_some(11));
        lookup
            .expect_settlement_id()
            .returning(|code| (code == "UA01").then_some(1));
        lookup
            .expect_city_district_settlement_id()
            .returning(|code| (code == "UA02").then_some(2));
        lookup
    }

    #[test]
    fn resolves_optional_references() {
        let table = Table::from_reader(DATA.as_bytes()).unwrap();
        let mut report = ImportReport::new();
        let employers = plan(&table, &lookup(), &mut report);

        assert_eq!(employers.len(), 3);
        assert_eq!(employers[0].kved_class_id, Some(11));
        assert_eq!(employers[0].settlement_id, Some(1));
        assert_eq!(employers[0].address, "вул. Шевченка, 1");
        assert_eq!(employers[1].settlement_id, Some(2));
        assert_eq!(employers[1].kved_class_id, None);
        assert_eq!(employers[2].kved_class_id, None);
        assert_eq!(employers[2].settlement_id, None);
        assert_eq!(report.unresolved, 2);
        assert_eq!(report.errors, 2);
    }
}
