use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::error::{Error, Result};
use crate::utils::text::clean_cell;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A `;`-delimited export held in memory. Loaders walk it several times.
#[derive(Debug)]
pub struct Table {
    columns: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    record: &'a StringRecord,
}

impl Table {
    /// Opening is the only fatal step of an import.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let columns = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header(name), idx))
            .collect();

        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record?);
        }

        Ok(Self { columns, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(&normalize_header(name))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |record| Row {
            table: self,
            record,
        })
    }
}

impl<'a> Row<'a> {
    /// Cleaned cell under the named column; blank when the column is missing.
    pub fn get(&self, column: &str) -> String {
        self.table
            .columns
            .get(&normalize_header(column))
            .and_then(|idx| self.record.get(*idx))
            .map(clean_cell)
            .unwrap_or_default()
    }

    /// Cleaned cell by position, for exports whose headers are unreliable.
    pub fn at(&self, idx: usize) -> String {
        self.record.get(idx).map(clean_cell).unwrap_or_default()
    }

    pub fn width(&self) -> usize {
        self.record.len()
    }

    pub fn line(&self) -> u64 {
        self.record.position().map(|p| p.line()).unwrap_or_default()
    }
}

/// Header cells in the official exports carry stray quotes, line breaks and
/// several apostrophe variants.
fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '"' | '\n' | '\r' | '\u{a0}'))
        .map(|c| match c {
            '\u{2019}' | '\u{02bc}' | '`' => '\'',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom_and_reads_semicolon_rows() {
        let data = "\u{feff}Код;Назва\n1;Перший\n2;Другий\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        let first = table.rows().next().unwrap();
        assert_eq!(first.get("Код"), "1");
        assert_eq!(first.get("Назва"), "Перший");
        assert_eq!(first.line(), 2);
    }

    #[test]
    fn headers_are_normalized() {
        let data = "\"Код\nсекції\";Категорія об’єкта\nA;O\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("Кодсекції"), "A");
        assert_eq!(row.get("Категорія об'єкта"), "O");
        assert!(table.has_column("Категорія об’єкта"));
    }

    #[test]
    fn missing_columns_and_short_rows_read_blank() {
        let data = "a;b;c\n1\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("b"), "");
        assert_eq!(row.get("zzz"), "");
        assert_eq!(row.at(5), "");
        assert_eq!(row.width(), 1);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = Table::open(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
