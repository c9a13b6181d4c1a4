//! CSV import for the deduction and crypto calculators.
//!
//! Parsers never fail: malformed input is collected as line-numbered
//! [`ImportError`]s next to whatever rows could be built. Callers decide
//! whether to run a calculation when errors are present.

pub mod crypto;
pub mod housing;
pub mod medical;

pub use crypto::parse_crypto_csv;
pub use housing::parse_housing_csv;
pub use medical::parse_medical_csv;

use crate::money::parse_amount;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;

/// One expected CSV column, generated by `#[derive(CsvSchema)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    /// 1-based line in the source file; the header is line 1.
    pub line: u64,
    pub message: String,
}

impl ImportError {
    pub fn new(line: u64, message: impl Into<String>) -> Self {
        ImportError {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvImport<T> {
    pub rows: Vec<T>,
    pub errors: Vec<ImportError>,
}

impl<T> Default for CsvImport<T> {
    fn default() -> Self {
        CsvImport {
            rows: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> CsvImport<T> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Header positions, keyed by lowercased column name.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_header(header: &StringRecord, schema: &[CsvField], errors: &mut Vec<ImportError>) -> Self {
        let mut index = HashMap::new();
        for (position, name) in header.iter().enumerate() {
            index.entry(name.to_lowercase()).or_insert(position);
        }
        for field in schema {
            if !index.contains_key(&field.name.to_lowercase()) {
                errors.push(ImportError::new(1, format!("{} 列が見つかりません。", field.name)));
            }
        }
        Columns(index)
    }
}

/// A data row with access by column name.
pub(crate) struct Row<'a> {
    line: u64,
    record: &'a StringRecord,
    columns: &'a Columns,
}

impl Row<'_> {
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Cell text, or `""` when the column or cell is missing.
    pub fn text(&self, column: &str) -> &str {
        self.columns
            .0
            .get(&column.to_lowercase())
            .and_then(|&i| self.record.get(i))
            .unwrap_or("")
    }

    /// Numeric cell. Empty is zero; unparsable is an error and zero.
    pub fn number(&self, column: &str, errors: &mut Vec<ImportError>) -> Decimal {
        self.optional_number(column, errors).unwrap_or(Decimal::ZERO)
    }

    /// Numeric cell that may be left blank.
    pub fn optional_number(&self, column: &str, errors: &mut Vec<ImportError>) -> Option<Decimal> {
        let raw = self.text(column);
        if raw.is_empty() {
            return None;
        }
        match parse_amount(raw) {
            Some(value) => Some(value),
            None => {
                errors.push(ImportError::new(
                    self.line,
                    format!("{column} に数値を入力してください。"),
                ));
                Some(Decimal::ZERO)
            }
        }
    }
}

/// Read a headed CSV and build one `T` per data row.
pub(crate) fn read_rows<R, T, F>(reader: R, schema: &[CsvField], mut build: F) -> CsvImport<T>
where
    R: Read,
    F: FnMut(&Row, &mut Vec<ImportError>) -> T,
{
    let mut result = CsvImport::default();
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = rdr.records();
    let header = loop {
        match records.next() {
            None => return result,
            Some(Ok(record)) if record.iter().all(str::is_empty) => continue,
            Some(Ok(record)) => break record,
            Some(Err(err)) => {
                result.errors.push(ImportError::new(1, err.to_string()));
                return result;
            }
        }
    };
    let columns = Columns::from_header(&header, schema, &mut result.errors);

    // Line numbers count non-blank lines only, with the header on line 1.
    let mut line = 1;
    for record in records {
        let record = match record {
            Ok(record) if record.iter().all(str::is_empty) => continue,
            Ok(record) => record,
            Err(err) => {
                line += 1;
                result.errors.push(ImportError::new(line, err.to_string()));
                continue;
            }
        };
        line += 1;
        let row = Row {
            line,
            record: &record,
            columns: &columns,
        };
        let item = build(&row, &mut result.errors);
        result.rows.push(item);
    }
    log::debug!(
        "csv import: {} rows, {} errors",
        result.rows.len(),
        result.errors.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[CsvField] = &[
        CsvField {
            name: "name",
            required: true,
            description: "",
        },
        CsvField {
            name: "value",
            required: false,
            description: "",
        },
    ];

    fn read(input: &str) -> CsvImport<(u64, String, Option<Decimal>)> {
        read_rows(input.as_bytes(), SCHEMA, |row, errors| {
            (
                row.line(),
                row.text("name").to_string(),
                row.optional_number("value", errors),
            )
        })
    }

    #[test]
    fn header_is_case_insensitive() {
        let result = read("NAME,Value\na,\"1,200\"\n");
        assert!(result.is_clean());
        assert_eq!(result.rows, vec![(2, "a".to_string(), Some(Decimal::new(1200, 0)))]);
    }

    #[test]
    fn blank_input_is_empty() {
        let result = read("");
        assert!(result.rows.is_empty());
        assert!(result.errors.is_empty());
        let result = read("\n\n");
        assert!(result.rows.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn bad_number_is_reported_and_zeroed() {
        let result = read("name,value\na,abc\nb,\n");
        assert_eq!(result.errors, vec![ImportError::new(2, "value に数値を入力してください。")]);
        assert_eq!(result.rows[0].2, Some(Decimal::ZERO));
        assert_eq!(result.rows[1].2, None);
    }

    #[test]
    fn blank_lines_are_not_counted() {
        let result = read("name,value\n\n b , 3 \n\nc,x\n");
        assert_eq!(
            result.rows,
            vec![
                (2, "b".to_string(), Some(Decimal::new(3, 0))),
                (3, "c".to_string(), Some(Decimal::ZERO)),
            ]
        );
        assert_eq!(result.errors, vec![ImportError::new(3, "value に数値を入力してください。")]);
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let result = read("name,value\nonly\n");
        assert!(result.is_clean());
        assert_eq!(result.rows[0].2, None);
    }
}
