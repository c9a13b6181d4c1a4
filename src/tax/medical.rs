use kakutei_derive::CsvSchema;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Floor of the medical-expense threshold (10万円).
const THRESHOLD_CAP: Decimal = dec!(100_000);
/// Share of total income used as the threshold when that is lower.
const THRESHOLD_INCOME_RATE: Decimal = dec!(0.05);

/// One medical bill paid during the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, CsvSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicalExpenseEntry {
    /// Hospital, clinic or pharmacy
    pub provider: String,
    /// Person who received the treatment
    pub patient: String,
    /// Amount paid (yen)
    #[schemars(with = "String")]
    pub amount: Decimal,
    /// Amount reimbursed by insurance (yen)
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub reimbursed: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalDeduction {
    pub total: Decimal,
    pub reimbursements: Decimal,
    pub net: Decimal,
    pub threshold: Decimal,
    pub deduction: Decimal,
}

/// Medical expense deduction (医療費控除).
///
/// `deduction = max(paid − reimbursed − min(100,000, 5% of income), 0)`
pub fn calculate_medical_deduction(
    entries: &[MedicalExpenseEntry],
    total_income: Decimal,
) -> MedicalDeduction {
    let total: Decimal = entries.iter().map(|e| e.amount).sum();
    let reimbursements: Decimal = entries.iter().filter_map(|e| e.reimbursed).sum();
    let net = total - reimbursements;
    let threshold = THRESHOLD_CAP.min(total_income * THRESHOLD_INCOME_RATE);
    let deduction = (net - threshold).max(Decimal::ZERO);

    MedicalDeduction {
        total,
        reimbursements,
        net,
        threshold,
        deduction,
    }
}
