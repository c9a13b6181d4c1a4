use super::{read_rows, CsvImport, ImportError};
use crate::tax::MedicalExpenseEntry;
use std::io::Read;

/// Columns: `provider, patient, amount, reimbursed`.
pub fn parse_medical_csv<R: Read>(reader: R) -> CsvImport<MedicalExpenseEntry> {
    read_rows(reader, MedicalExpenseEntry::csv_schema(), |row, errors| {
        let provider = row.text("provider").to_string();
        let patient = row.text("patient").to_string();
        if provider.is_empty() || patient.is_empty() {
            errors.push(ImportError::new(row.line(), "provider と patient は必須です。"));
        }
        MedicalExpenseEntry {
            provider,
            patient,
            amount: row.number("amount", errors),
            reimbursed: row.optional_number("reimbursed", errors),
        }
    })
}
