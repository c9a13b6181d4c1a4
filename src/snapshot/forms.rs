//! Form data as the filing steps store it: free text, every field optional.

use super::{AttachmentRecord, AttachmentStatus, FilingCategory, TaxpayerInfo};
use crate::money::parse_amount_or_zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const UNNAMED_TAXPAYER: &str = "未入力";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxpayerForm {
    pub full_name: String,
    pub full_name_kana: String,
    pub my_number: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub filing_category: String,
    pub filing_year: String,
    pub memo: String,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl TaxpayerForm {
    /// `fallback_year` is used when the filing year is blank or not a number.
    pub fn normalize(&self, fallback_year: i32) -> TaxpayerInfo {
        let filing_category = if self.filing_category.trim() == "white" {
            FilingCategory::White
        } else {
            FilingCategory::Blue
        };
        TaxpayerInfo {
            full_name: non_empty(&self.full_name).unwrap_or_else(|| UNNAMED_TAXPAYER.to_string()),
            full_name_kana: non_empty(&self.full_name_kana),
            my_number: non_empty(&self.my_number),
            address: self.address.trim().to_string(),
            phone: non_empty(&self.phone),
            email: non_empty(&self.email),
            filing_category,
            filing_year: self.filing_year.trim().parse().unwrap_or(fallback_year),
        }
    }
}

/// One income line from the incomes step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeRow {
    pub id: String,
    pub label: String,
    pub category: String,
    pub amount: String,
    pub withholding_tax: String,
    pub notes: String,
}

impl IncomeRow {
    pub fn amount(&self) -> Decimal {
        parse_amount_or_zero(&self.amount)
    }

    pub fn withholding(&self) -> Decimal {
        parse_amount_or_zero(&self.withholding_tax)
    }
}

/// One deduction line. `id` doubles as the deduction key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeductionRow {
    pub id: String,
    pub label: String,
    pub amount: String,
    pub notes: String,
}

impl DeductionRow {
    pub fn amount(&self) -> Decimal {
        parse_amount_or_zero(&self.amount)
    }
}

/// Figures typed into the tax step. A blank or zero field means "compute it".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxOverrides {
    pub taxable_income: String,
    pub income_tax: String,
    pub special_reconstruction_tax: String,
    pub municipal_tax: String,
    pub national_health_insurance: String,
    pub expected_refund: String,
    pub amount_due: String,
    pub memo: String,
}

/// Supporting document tracked in the documents step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentItem {
    pub id: String,
    pub label: String,
    pub status: String,
    pub notes: String,
}

impl DocumentItem {
    pub fn to_attachment(&self) -> AttachmentRecord {
        AttachmentRecord {
            label: self.label.clone(),
            required: true,
            status: AttachmentStatus::parse_lenient(&self.status),
        }
    }
}
