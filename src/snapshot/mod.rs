//! The assembled tax return handed to PDF and e-filing renderers.
//!
//! A [`TaxReturnSnapshot`] serializes to JSON with camelCase keys in field
//! declaration order, so the same snapshot always produces the same bytes
//! and the same [`fingerprint`](TaxReturnSnapshot::fingerprint).

mod assemble;
mod forms;

pub use assemble::{assemble_snapshot, should_replace_stored};
pub use forms::{DeductionRow, DocumentItem, IncomeRow, TaxOverrides, TaxpayerForm};

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("no valid snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilingCategory {
    /// 青色申告
    #[default]
    Blue,
    /// 白色申告
    White,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxpayerInfo {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name_kana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_number: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub filing_category: FilingCategory,
    pub filing_year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncomeCategory {
    Salary,
    Business,
    RealEstate,
    Dividend,
    Misc,
    Crypto,
    Temporary,
    #[serde(other)]
    Other,
}

impl IncomeCategory {
    /// Unrecognized categories become `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "salary" => IncomeCategory::Salary,
            "business" => IncomeCategory::Business,
            "real_estate" => IncomeCategory::RealEstate,
            "dividend" => IncomeCategory::Dividend,
            "misc" => IncomeCategory::Misc,
            "crypto" => IncomeCategory::Crypto,
            "temporary" => IncomeCategory::Temporary,
            _ => IncomeCategory::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeDetail {
    pub category: IncomeCategory,
    pub label: String,
    #[schemars(with = "String")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub withholding_tax: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKey {
    Basic,
    Spouse,
    SpouseSpecial,
    Dependents,
    SocialInsurance,
    LifeInsurance,
    EarthquakeInsurance,
    Medical,
    Donation,
    SmallBusinessMutual,
    Housing,
    #[serde(other)]
    Other,
}

impl DeductionKey {
    /// Unrecognized keys become `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "basic" => DeductionKey::Basic,
            "spouse" => DeductionKey::Spouse,
            "spouse_special" => DeductionKey::SpouseSpecial,
            "dependents" => DeductionKey::Dependents,
            "social_insurance" => DeductionKey::SocialInsurance,
            "life_insurance" => DeductionKey::LifeInsurance,
            "earthquake_insurance" => DeductionKey::EarthquakeInsurance,
            "medical" => DeductionKey::Medical,
            "donation" => DeductionKey::Donation,
            "small_business_mutual" => DeductionKey::SmallBusinessMutual,
            "housing" => DeductionKey::Housing,
            _ => DeductionKey::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeductionKey::Basic => "基礎控除",
            DeductionKey::Spouse => "配偶者控除",
            DeductionKey::SpouseSpecial => "配偶者特別控除",
            DeductionKey::Dependents => "扶養控除",
            DeductionKey::SocialInsurance => "社会保険料控除",
            DeductionKey::LifeInsurance => "生命保険料控除",
            DeductionKey::EarthquakeInsurance => "地震保険料控除",
            DeductionKey::Medical => "医療費控除",
            DeductionKey::Donation => "寄附金控除",
            DeductionKey::SmallBusinessMutual => "小規模企業共済等掛金控除",
            DeductionKey::Housing => "住宅ローン控除",
            DeductionKey::Other => "その他控除",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeductionDetail {
    pub key: DeductionKey,
    pub label: String,
    #[schemars(with = "String")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Withholding,
    EstimatedTax,
    #[serde(other)]
    Other,
}

/// Tax already paid during the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub label: String,
    #[schemars(with = "String")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntrySummary {
    #[schemars(with = "String")]
    pub total_sales: Decimal,
    #[schemars(with = "String")]
    pub total_expenses: Decimal,
    #[schemars(with = "String")]
    pub net_income: Decimal,
    #[schemars(with = "String")]
    pub asset_total: Decimal,
    #[schemars(with = "String")]
    pub liability_total: Decimal,
    #[schemars(with = "String")]
    pub equity_total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentStatus {
    Uploaded,
    Verified,
    #[default]
    #[serde(other)]
    Pending,
}

impl AttachmentStatus {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "uploaded" => AttachmentStatus::Uploaded,
            "verified" => AttachmentStatus::Verified,
            _ => AttachmentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRecord {
    pub label: String,
    pub required: bool,
    pub status: AttachmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxComputation {
    #[schemars(with = "String")]
    pub taxable_income: Decimal,
    #[schemars(with = "String")]
    pub income_tax: Decimal,
    /// 復興特別所得税
    #[schemars(with = "String")]
    pub special_reconstruction_tax: Decimal,
    #[schemars(with = "String")]
    pub municipal_tax: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub national_health_insurance: Option<Decimal>,
    #[schemars(with = "String")]
    pub expected_refund: Decimal,
    #[schemars(with = "String")]
    pub amount_due: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxReturnSnapshot {
    pub taxpayer: TaxpayerInfo,
    pub incomes: Vec<IncomeDetail>,
    pub deductions: Vec<DeductionDetail>,
    pub payments: Vec<PaymentRecord>,
    pub journal: JournalEntrySummary,
    pub attachments: Vec<AttachmentRecord>,
    pub computation: TaxComputation,
}

impl TaxReturnSnapshot {
    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA-256 of the compact JSON encoding, hex encoded.
    pub fn fingerprint(&self) -> String {
        // Serializing plain data to a Vec cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}

/// Parse a whole snapshot document. Anything malformed is rejected.
pub fn parse_snapshot(json: &str) -> Result<TaxReturnSnapshot, SnapshotError> {
    Ok(serde_json::from_str(json)?)
}

/// Like [`parse_snapshot`], for a document already held as JSON.
pub fn snapshot_from_value(
    value: &serde_json::Value,
) -> Result<TaxReturnSnapshot, SnapshotError> {
    Ok(TaxReturnSnapshot::deserialize(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> TaxReturnSnapshot {
        TaxReturnSnapshot {
            taxpayer: TaxpayerInfo {
                full_name: "山田 太郎".to_string(),
                full_name_kana: Some("ヤマダ タロウ".to_string()),
                my_number: None,
                address: "東京都千代田区1-1-1".to_string(),
                phone: None,
                email: None,
                filing_category: FilingCategory::Blue,
                filing_year: 2024,
            },
            incomes: vec![IncomeDetail {
                category: IncomeCategory::Salary,
                label: "給与所得".to_string(),
                amount: dec!(4_800_000),
                withholding_tax: Some(dec!(450_000)),
            }],
            deductions: vec![DeductionDetail {
                key: DeductionKey::Basic,
                label: "基礎控除".to_string(),
                amount: dec!(480_000),
            }],
            payments: vec![],
            journal: JournalEntrySummary::default(),
            attachments: vec![AttachmentRecord {
                label: "源泉徴収票".to_string(),
                required: true,
                status: AttachmentStatus::Uploaded,
            }],
            computation: TaxComputation {
                taxable_income: dec!(4_320_000),
                income_tax: dec!(436_500),
                special_reconstruction_tax: dec!(9_167),
                ..Default::default()
            },
        }
    }

    #[test]
    fn keys_are_camel_case_in_declared_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        let order = [
            "\"taxpayer\"",
            "\"incomes\"",
            "\"deductions\"",
            "\"payments\"",
            "\"journal\"",
            "\"attachments\"",
            "\"computation\"",
        ];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"specialReconstructionTax\""));
        assert!(json.contains("\"withholdingTax\""));
        assert!(!json.contains("nationalHealthInsurance"));
        assert!(!json.contains("myNumber"));
    }

    #[test]
    fn parse_round_trip() {
        let snapshot = sample();
        let json = snapshot.to_json_pretty().unwrap();
        assert_eq!(parse_snapshot(&json).unwrap(), snapshot);
    }

    #[test]
    fn parses_numeric_amounts() {
        let json = r#"{
            "taxpayer": {"fullName": "A", "address": "", "filingCategory": "white", "filingYear": 2024},
            "incomes": [{"category": "side_job", "label": "x", "amount": 1000}],
            "deductions": [],
            "payments": [{"type": "estimated_tax", "label": "予定納税", "amount": 120000}],
            "journal": {"totalSales": 0, "totalExpenses": 0, "netIncome": 0,
                        "assetTotal": 0, "liabilityTotal": 0, "equityTotal": 0},
            "attachments": [{"label": "x", "required": false, "status": "lost"}],
            "computation": {"taxableIncome": 0, "incomeTax": 0, "specialReconstructionTax": 0,
                            "municipalTax": 0, "expectedRefund": 0, "amountDue": 0}
        }"#;
        let snapshot = parse_snapshot(json).unwrap();
        assert_eq!(snapshot.taxpayer.filing_category, FilingCategory::White);
        assert_eq!(snapshot.incomes[0].category, IncomeCategory::Other);
        assert_eq!(snapshot.incomes[0].amount, dec!(1000));
        assert_eq!(snapshot.payments[0].payment_type, PaymentType::EstimatedTax);
        assert_eq!(snapshot.attachments[0].status, AttachmentStatus::Pending);
    }

    #[test]
    fn attachment_status_wire_names() {
        let statuses: Vec<AttachmentStatus> =
            serde_json::from_str(r#"["uploaded", "verified", "pending", "missing"]"#).unwrap();
        assert_eq!(
            statuses,
            [
                AttachmentStatus::Uploaded,
                AttachmentStatus::Verified,
                AttachmentStatus::Pending,
                AttachmentStatus::Pending,
            ]
        );
        assert_eq!(serde_json::to_string(&AttachmentStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(AttachmentStatus::default(), AttachmentStatus::Pending);
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(parse_snapshot("{\"taxpayer\": ").is_err());
        assert!(parse_snapshot("{}").is_err());
        assert!(parse_snapshot("[]").is_err());
    }

    #[test]
    fn stored_value_is_checked_like_text() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(snapshot_from_value(&value).unwrap(), sample());

        let mut edited = value.clone();
        edited["computation"]["municipalTax"] = "12万".into();
        let err = snapshot_from_value(&edited).unwrap_err();
        assert!(err.to_string().starts_with("no valid snapshot"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        b.computation.municipal_tax = dec!(1);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn lenient_enums() {
        assert_eq!(IncomeCategory::parse_lenient("real_estate"), IncomeCategory::RealEstate);
        assert_eq!(IncomeCategory::parse_lenient("bonus"), IncomeCategory::Other);
        assert_eq!(DeductionKey::parse_lenient("medical"), DeductionKey::Medical);
        assert_eq!(DeductionKey::parse_lenient(""), DeductionKey::Other);
        assert_eq!(DeductionKey::SmallBusinessMutual.label(), "小規模企業共済等掛金控除");
        assert_eq!(AttachmentStatus::parse_lenient("verified"), AttachmentStatus::Verified);
        assert_eq!(AttachmentStatus::parse_lenient("?"), AttachmentStatus::Pending);
    }
}
