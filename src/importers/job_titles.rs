use std::collections::HashMap;
use std::path::Path;

use sqlx::PgPool;

use crate::error::Result;
use crate::importers::report::ImportReport;
use crate::importers::source::Table;
use crate::models::occupation::UnitKind;
use crate::utils::text::non_empty;

pub const DEFAULT_FILE: &str = "temp/classification_of_professions_details.csv";

pub const ENTITY: &str = "job titles";

const REPEATED_HEADER: &str = "КОД КП";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Position(i64),
    Group(i64),
    Subclass(i64),
}

impl Attachment {
    pub fn attached_to(&self) -> &'static str {
        match self {
            Attachment::Position(_) => "position",
            Attachment::Group(_) => "group",
            Attachment::Subclass(_) => "subclass",
        }
    }

    pub fn position_id(&self) -> Option<i64> {
        match self {
            Attachment::Position(id) => Some(*id),
            _ => None,
        }
    }

    pub fn unit_id(&self) -> Option<i64> {
        match self {
            Attachment::Group(id) | Attachment::Subclass(id) => Some(*id),
            Attachment::Position(_) => None,
        }
    }
}

/// KP nodes a job title can hang off, by code.
#[derive(Debug, Clone, Default)]
pub struct KpTargets {
    positions: HashMap<String, Vec<i64>>,
    units: HashMap<String, (i64, UnitKind)>,
}

impl KpTargets {
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let mut targets = Self::default();

        let positions: Vec<(String, i64)> =
            sqlx::query_as("SELECT code, id FROM kp_positions ORDER BY id")
                .fetch_all(pool)
                .await?;
        for (code, id) in positions {
            targets = targets.with_position(&code, id);
        }

        let units: Vec<(String, i64, String)> =
            sqlx::query_as("SELECT code, id, kind FROM kp_units")
                .fetch_all(pool)
                .await?;
        for (code, id, kind) in units {
            if let Some(kind) = UnitKind::parse(&kind) {
                targets = targets.with_unit(&code, id, kind);
            }
        }

        Ok(targets)
    }

    pub fn with_position(mut self, code: &str, id: i64) -> Self {
        let ids = self.positions.entry(code.to_string()).or_default();
        ids.push(id);
        ids.sort_unstable();
        self
    }

    pub fn with_unit(mut self, code: &str, id: i64, kind: UnitKind) -> Self {
        self.units.insert(code.to_string(), (id, kind));
        self
    }

    /// Position wins over group, group over subclass. Several positions
    /// sharing the code resolve to the lowest id and flag the match as
    /// ambiguous.
    pub fn resolve(&self, code: &str) -> (Option<Attachment>, bool) {
        if let Some(ids) = self.positions.get(code) {
            if let Some(&first) = ids.first() {
                return (Some(Attachment::Position(first)), ids.len() > 1);
            }
        }
        let attachment = self.units.get(code).map(|(id, kind)| match kind {
            UnitKind::Group => Attachment::Group(*id),
            UnitKind::Subclass => Attachment::Subclass(*id),
        });
        (attachment, false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobTitleUpsert {
    pub code: String,
    pub name: String,
    pub zkpptr_code: Option<String>,
    pub etkd_issue: Option<String>,
    pub dkhp_issue: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Columns are positional: code, ZKPPTR, ETKD, DKHP, name.
pub fn plan(table: &Table, targets: &KpTargets) -> (Vec<JobTitleUpsert>, ImportReport<&'static str>) {
    let mut report = ImportReport::new();
    let mut upserts = Vec::new();

    for row in table.rows() {
        let code = row.at(0);
        let name = row.at(4);
        if row.width() < 5 || code.is_empty() || code == REPEATED_HEADER || name.is_empty() {
            report.ignored += 1;
            continue;
        }

        let (attachment, ambiguous) = targets.resolve(&code);
        if ambiguous {
            tracing::warn!(
                "Code {} matches several positions, attaching '{}' to the first",
                code,
                name
            );
            report.ambiguous += 1;
        }
        if attachment.is_none() {
            tracing::debug!("No KP node for job title {} ({})", name, code);
            report.unresolved += 1;
        }

        upserts.push(JobTitleUpsert {
            zkpptr_code: non_empty(&row.at(1)),
            etkd_issue: non_empty(&row.at(2)),
            dkhp_issue: non_empty(&row.at(3)),
            code,
            name,
            attachment,
        });
    }

    (upserts, report)
}

async fn upsert(pool: &PgPool, title: &JobTitleUpsert) -> Result<bool> {
    let inserted = sqlx::query_scalar::<_, bool>(
        r#"
        INSERT INTO job_titles
            (code, name, zkpptr_code, etkd_issue, dkhp_issue, position_id, unit_id, attached_to)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (code, name) DO UPDATE SET
            zkpptr_code = EXCLUDED.zkpptr_code,
            etkd_issue = EXCLUDED.etkd_issue,
            dkhp_issue = EXCLUDED.dkhp_issue,
            position_id = EXCLUDED.position_id,
            unit_id = EXCLUDED.unit_id,
            attached_to = EXCLUDED.attached_to
        RETURNING (xmax = 0)
        "#,
    )
    .bind(&title.code)
    .bind(&title.name)
    .bind(&title.zkpptr_code)
    .bind(&title.etkd_issue)
    .bind(&title.dkhp_issue)
    .bind(title.attachment.and_then(|a| a.position_id()))
    .bind(title.attachment.and_then(|a| a.unit_id()))
    .bind(title.attachment.map(|a| a.attached_to()))
    .fetch_one(pool)
    .await?;
    Ok(inserted)
}

pub async fn persist(pool: &PgPool, titles: &[JobTitleUpsert], report: &mut ImportReport<&'static str>) {
    for (idx, title) in titles.iter().enumerate() {
        match upsert(pool, title).await {
            Ok(true) => report.record_created(ENTITY),
            Ok(false) => report.updated += 1,
            Err(e) => {
                tracing::error!("Error creating {} ({}): {}", title.name, title.code, e);
                report.errors += 1;
            }
        }
        if (idx + 1) % 1000 == 0 {
            tracing::info!("Processed {} records...", idx + 1);
        }
    }
}

pub async fn run(pool: &PgPool, path: &Path) -> Result<ImportReport<&'static str>> {
    let table = Table::open(path)?;
    tracing::info!("Loading {} job title rows from {}", table.len(), path.display());

    let targets = KpTargets::load(pool).await?;
    let (titles, mut report) = plan(&table, &targets);
    persist(pool, &titles, &mut report).await;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "\
КОД КП;КОД ЗКППТР;ВИПУСК ЄТКД;ВИПУСК ДКХП;ПРОФЕСІЙНА НАЗВА РОБОТИ
1120.1;21467;;;Генеральний директор
1120;;;;Керівник підприємства
1130;;;;Керівник малого підприємства
9999;;;;Невідома група
КОД КП;;;;ПРОФЕСІЙНА НАЗВА РОБОТИ
;;;;Без коду
1120.1;;;;
";

    fn targets() -> KpTargets {
        KpTargets::default()
            .with_position("1120.1", 7)
            .with_unit("1120", 3, UnitKind::Group)
            .with_unit("1130", 4, UnitKind::Subclass)
    }

    fn table() -> Table {
        Table::from_reader(DATA.as_bytes()).unwrap()
    }

    #[test]
    fn attaches_by_precedence() {
        let (titles, report) = plan(&table(), &targets());

        assert_eq!(titles.len(), 4);
        assert_eq!(titles[0].attachment, Some(Attachment::Position(7)));
        assert_eq!(titles[0].zkpptr_code.as_deref(), Some("21467"));
        assert_eq!(titles[0].etkd_issue, None);
        assert_eq!(titles[1].attachment, Some(Attachment::Group(3)));
        assert_eq!(titles[2].attachment, Some(Attachment::Subclass(4)));
        assert_eq!(titles[3].attachment, None);
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.ignored, 3);
    }

    #[test]
    fn position_beats_unit_with_the_same_code() {
        let targets = KpTargets::default()
            .with_unit("1120.1", 1, UnitKind::Group)
            .with_position("1120.1", 9);
        assert_eq!(targets.resolve("1120.1"), (Some(Attachment::Position(9)), false));
    }

    #[test]
    fn duplicate_positions_take_lowest_id_and_count_as_ambiguous() {
        let targets = targets().with_position("1120.1", 5);
        let (titles, report) = plan(&table(), &targets);

        assert_eq!(titles[0].attachment, Some(Attachment::Position(5)));
        assert_eq!(report.ambiguous, 1);
    }

    #[test]
    fn attachment_columns() {
        let group = Attachment::Group(3);
        assert_eq!(group.unit_id(), Some(3));
        assert_eq!(group.position_id(), None);
        assert_eq!(group.attached_to(), "group");
        assert_eq!(Attachment::Position(1).unit_id(), None);
    }
}
