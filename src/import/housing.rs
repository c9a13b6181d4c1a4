use super::{read_rows, CsvImport, ImportError};
use crate::tax::HousingLoanRecord;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io::Read;

/// Columns: `year, outstandingPrincipal, deductionRate, maxDeduction`
/// (matched case-insensitively). `deductionRate` is a percentage.
pub fn parse_housing_csv<R: Read>(reader: R) -> CsvImport<HousingLoanRecord> {
    read_rows(reader, HousingLoanRecord::csv_schema(), |row, errors| {
        let year = row.number("year", errors).trunc().to_i32().unwrap_or(0);
        let record = HousingLoanRecord {
            year,
            outstanding_principal: row.number("outstandingPrincipal", errors),
            deduction_rate: row.number("deductionRate", errors) / Decimal::ONE_HUNDRED,
            max_deduction: row.number("maxDeduction", errors),
        };
        if year == 0 {
            errors.push(ImportError::new(row.line(), "year は必須です。"));
        }
        record
    })
}
