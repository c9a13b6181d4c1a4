use crate::money::round_yen;
use kakutei_derive::CsvSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Year-end balance statement for a housing loan (住宅ローン残高証明).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, CsvSchema)]
#[serde(rename_all = "camelCase")]
pub struct HousingLoanRecord {
    /// Tax year of the balance statement
    pub year: i32,
    /// Outstanding principal at year end (yen)
    #[schemars(with = "String")]
    pub outstanding_principal: Decimal,
    /// Deduction rate (percent in CSV, stored as a fraction)
    #[schemars(with = "String")]
    pub deduction_rate: Decimal,
    /// Maximum deduction allowed for the year (yen)
    #[schemars(with = "String")]
    pub max_deduction: Decimal,
}

impl HousingLoanRecord {
    /// `outstanding_principal × deduction_rate`, rounded to whole yen.
    pub fn raw_deduction(&self) -> Decimal {
        round_yen(self.outstanding_principal * self.deduction_rate)
    }
}

/// Housing loan credit (住宅借入金等特別控除) for the most recent record.
///
/// The credit is capped first by the record's maximum and then by
/// `income_tax`, the liability it offsets.
pub fn calculate_housing_loan_deduction(records: &[HousingLoanRecord], income_tax: Decimal) -> Decimal {
    let latest = records
        .iter()
        .reduce(|best, r| if r.year > best.year { r } else { best });

    let Some(latest) = latest else {
        return Decimal::ZERO;
    };

    let raw = latest.raw_deduction();
    let capped = raw.min(latest.max_deduction);
    let deduction = capped.min(income_tax);
    log::debug!(
        "housing loan {}: raw={}, capped={}, deduction={}",
        latest.year,
        raw,
        capped,
        deduction
    );
    deduction
}
