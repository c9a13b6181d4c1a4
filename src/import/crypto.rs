use super::{read_rows, CsvImport, ImportError};
use crate::tax::{CryptoTrade, TradeSide};
use std::io::Read;

/// Columns: `date, pair, side, quantity, price, fee`.
///
/// Each trade is identified by its source line, `trade-<line>`.
pub fn parse_crypto_csv<R: Read>(reader: R) -> CsvImport<CryptoTrade> {
    read_rows(reader, CryptoTrade::csv_schema(), |row, errors| {
        let date = row.text("date").to_string();
        let pair = row.text("pair").to_string();
        if date.is_empty() || pair.is_empty() {
            errors.push(ImportError::new(row.line(), "date と pair は必須です。"));
        }
        CryptoTrade {
            id: format!("trade-{}", row.line()),
            date,
            pair,
            side: TradeSide::parse_lenient(row.text("side")),
            quantity: row.number("quantity", errors),
            price: row.number("price", errors),
            fee: row.optional_number("fee", errors),
        }
    })
}
