use super::forms::{DeductionRow, DocumentItem, IncomeRow, TaxOverrides};
use super::{
    DeductionDetail, DeductionKey, IncomeCategory, IncomeDetail, JournalEntrySummary,
    PaymentRecord, PaymentType, TaxComputation, TaxReturnSnapshot, TaxpayerInfo,
};
use crate::ledger::FinancialStatements;
use crate::money::{parse_amount_or_zero, round_yen};
use crate::tax::{resolve_bracket, TaxConfig};
use rust_decimal::Decimal;

const UNCATEGORIZED_INCOME: &str = "未分類所得";

/// A manually entered figure, if it was given and is not zero.
fn override_value(field: &str) -> Option<Decimal> {
    let value = parse_amount_or_zero(field);
    (!value.is_zero()).then_some(value)
}

fn label_or(label: &str, default: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        default.to_string()
    } else {
        label.to_string()
    }
}

/// Merge the filing steps into one return.
///
/// Rows with a non-positive amount are dropped. Each computed figure uses the
/// manual override when one is present and non-zero; otherwise it is derived
/// from the kept rows, so the computation always agrees with the incomes and
/// deductions it is shipped with.
pub fn assemble_snapshot(
    taxpayer: TaxpayerInfo,
    income_rows: &[IncomeRow],
    deduction_rows: &[DeductionRow],
    overrides: &TaxOverrides,
    config: &TaxConfig,
) -> TaxReturnSnapshot {
    let incomes: Vec<IncomeDetail> = income_rows
        .iter()
        .filter(|row| row.amount() > Decimal::ZERO)
        .map(|row| {
            let withholding = row.withholding();
            IncomeDetail {
                category: IncomeCategory::parse_lenient(&row.category),
                label: label_or(&row.label, UNCATEGORIZED_INCOME),
                amount: row.amount(),
                withholding_tax: (withholding > Decimal::ZERO).then_some(withholding),
            }
        })
        .collect();

    let deductions: Vec<DeductionDetail> = deduction_rows
        .iter()
        .filter(|row| row.amount() > Decimal::ZERO)
        .map(|row| {
            let key = DeductionKey::parse_lenient(&row.id);
            DeductionDetail {
                key,
                label: label_or(&row.label, key.label()),
                amount: row.amount(),
            }
        })
        .collect();

    let payments: Vec<PaymentRecord> = incomes
        .iter()
        .filter_map(|income| {
            Some(PaymentRecord {
                payment_type: PaymentType::Withholding,
                label: format!("{}の源泉徴収", income.label),
                amount: income.withholding_tax?,
            })
        })
        .collect();

    let income_total: Decimal = incomes.iter().map(|i| i.amount).sum();
    let deduction_total: Decimal = deductions.iter().map(|d| d.amount).sum();

    let taxable_income = override_value(&overrides.taxable_income)
        .map(round_yen)
        .unwrap_or_else(|| round_yen((income_total - deduction_total).max(Decimal::ZERO)));
    let derived = resolve_bracket(taxable_income, config);
    let income_tax = override_value(&overrides.income_tax).unwrap_or(derived.income_tax);
    let special_reconstruction_tax =
        override_value(&overrides.special_reconstruction_tax).unwrap_or(derived.surtax);

    let paid: Decimal = payments.iter().map(|p| p.amount).sum();
    let owed = income_tax + special_reconstruction_tax;
    let amount_due = override_value(&overrides.amount_due)
        .unwrap_or_else(|| (owed - paid).max(Decimal::ZERO));
    let expected_refund = override_value(&overrides.expected_refund)
        .unwrap_or_else(|| (paid - owed).max(Decimal::ZERO));

    let national_health_insurance = Some(parse_amount_or_zero(&overrides.national_health_insurance))
        .filter(|nhi| *nhi > Decimal::ZERO);

    log::debug!(
        "assembled snapshot: income={}, deductions={}, taxable={}, tax={}+{}",
        income_total,
        deduction_total,
        taxable_income,
        income_tax,
        special_reconstruction_tax
    );

    TaxReturnSnapshot {
        taxpayer,
        incomes,
        deductions,
        payments,
        journal: JournalEntrySummary {
            total_sales: income_total,
            total_expenses: deduction_total,
            net_income: income_total - deduction_total,
            ..Default::default()
        },
        attachments: Vec::new(),
        computation: TaxComputation {
            taxable_income,
            income_tax,
            special_reconstruction_tax,
            municipal_tax: parse_amount_or_zero(&overrides.municipal_tax),
            national_health_insurance,
            expected_refund,
            amount_due,
        },
    }
}

impl TaxReturnSnapshot {
    /// Replace the journal summary with totals from the bookkeeping ledger.
    /// Equity includes the current period's net income.
    pub fn with_ledger(mut self, statements: &FinancialStatements) -> Self {
        let pl = &statements.profit_and_loss;
        let bs = &statements.balance_sheet;
        self.journal = JournalEntrySummary {
            total_sales: pl.total_revenue,
            total_expenses: pl.total_expenses,
            net_income: pl.net_income,
            asset_total: bs.total_assets,
            liability_total: bs.total_liabilities,
            equity_total: bs.total_equity + pl.net_income,
        };
        self
    }

    pub fn with_attachments(mut self, documents: &[DocumentItem]) -> Self {
        self.attachments = documents.iter().map(DocumentItem::to_attachment).collect();
        self
    }
}

/// Whether a freshly assembled snapshot should replace the stored one.
///
/// The stored snapshot follows the filing steps until someone edits it by
/// hand: it is replaced when there is none, or when it is still exactly the
/// last snapshot assembled automatically (`last_auto` fingerprint).
pub fn should_replace_stored(
    stored: Option<&TaxReturnSnapshot>,
    last_auto: Option<&str>,
    assembled: &TaxReturnSnapshot,
) -> bool {
    match stored {
        None => true,
        Some(stored) if stored == assembled => false,
        Some(stored) => last_auto == Some(stored.fingerprint().as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{compute_statements, JournalEntry};
    use crate::snapshot::{AttachmentStatus, FilingCategory, TaxpayerForm};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn taxpayer() -> TaxpayerInfo {
        TaxpayerForm::default().normalize(2024)
    }

    fn income(category: &str, label: &str, amount: &str) -> IncomeRow {
        IncomeRow {
            category: category.to_string(),
            label: label.to_string(),
            amount: amount.to_string(),
            ..Default::default()
        }
    }

    fn deduction(id: &str, amount: &str) -> DeductionRow {
        DeductionRow {
            id: id.to_string(),
            amount: amount.to_string(),
            ..Default::default()
        }
    }

    fn assemble(incomes: &[IncomeRow], deductions: &[DeductionRow], overrides: &TaxOverrides) -> TaxReturnSnapshot {
        assemble_snapshot(taxpayer(), incomes, deductions, overrides, &TaxConfig::default())
    }

    #[test]
    fn derives_tax_from_rows() {
        let incomes = vec![
            income("salary", "給与所得", "4,800,000"),
            income("business", "事業所得", "400,000"),
        ];
        let deductions = vec![deduction("basic", "480000"), deduction("social_insurance", "200000")];
        let snapshot = assemble(&incomes, &deductions, &TaxOverrides::default());

        let c = &snapshot.computation;
        assert_eq!(c.taxable_income, dec!(4_520_000));
        assert_eq!(c.income_tax, dec!(476_500));
        assert_eq!(c.special_reconstruction_tax, dec!(10_007));
        assert_eq!(c.amount_due, dec!(486_507));
        assert_eq!(c.expected_refund, dec!(0));
        assert_eq!(c.national_health_insurance, None);
        assert_eq!(snapshot.deductions[0].label, "基礎控除");
        assert_eq!(snapshot.deductions[1].label, "社会保険料控除");
        assert_eq!(snapshot.journal.total_sales, dec!(5_200_000));
        assert_eq!(snapshot.journal.net_income, dec!(4_520_000));
        assert_eq!(snapshot.taxpayer.filing_category, FilingCategory::Blue);
    }

    #[test]
    fn drops_non_positive_rows_and_normalizes() {
        let incomes = vec![
            income("side_job", "", "300000"),
            income("salary", "給与", "0"),
            income("salary", "給与", "-5"),
            income("salary", "給与", "abc"),
        ];
        let deductions = vec![deduction("mystery", "10000"), deduction("medical", "")];
        let snapshot = assemble(&incomes, &deductions, &TaxOverrides::default());

        assert_eq!(snapshot.incomes.len(), 1);
        assert_eq!(snapshot.incomes[0].category, IncomeCategory::Other);
        assert_eq!(snapshot.incomes[0].label, "未分類所得");
        assert_eq!(snapshot.deductions.len(), 1);
        assert_eq!(snapshot.deductions[0].key, DeductionKey::Other);
        assert_eq!(snapshot.deductions[0].label, "その他控除");
        assert_eq!(snapshot.computation.taxable_income, dec!(290_000));
    }

    #[test]
    fn taxable_income_floors_at_zero() {
        let incomes = vec![income("salary", "給与", "400000")];
        let deductions = vec![deduction("basic", "480000")];
        let snapshot = assemble(&incomes, &deductions, &TaxOverrides::default());
        assert_eq!(snapshot.computation.taxable_income, dec!(0));
        assert_eq!(snapshot.computation.income_tax, dec!(0));
        assert_eq!(snapshot.computation.special_reconstruction_tax, dec!(0));
    }

    #[test]
    fn overrides_win_when_non_zero() {
        let incomes = vec![income("salary", "給与", "5000000")];
        let overrides = TaxOverrides {
            taxable_income: "3,000,000".to_string(),
            income_tax: "0".to_string(),
            special_reconstruction_tax: "4000".to_string(),
            municipal_tax: "300000".to_string(),
            national_health_insurance: "120000".to_string(),
            expected_refund: "".to_string(),
            amount_due: "50000".to_string(),
            ..Default::default()
        };
        let snapshot = assemble(&incomes, &[], &overrides);
        let c = &snapshot.computation;
        assert_eq!(c.taxable_income, dec!(3_000_000));
        // Zero override falls back to the bracket value for 3,000,000.
        assert_eq!(c.income_tax, dec!(202_500));
        assert_eq!(c.special_reconstruction_tax, dec!(4_000));
        assert_eq!(c.municipal_tax, dec!(300_000));
        assert_eq!(c.national_health_insurance, Some(dec!(120_000)));
        assert_eq!(c.amount_due, dec!(50_000));
        assert_eq!(c.expected_refund, dec!(0));
    }

    #[test]
    fn withholding_becomes_payment_and_refund() {
        let mut salary = income("salary", "給与所得", "3000000");
        salary.withholding_tax = "250,000".to_string();
        let snapshot = assemble(&[salary], &[deduction("basic", "480000")], &TaxOverrides::default());

        // 2,520,000 → 154,500 + 3,245
        assert_eq!(snapshot.payments.len(), 1);
        assert_eq!(snapshot.payments[0].payment_type, PaymentType::Withholding);
        assert_eq!(snapshot.payments[0].label, "給与所得の源泉徴収");
        assert_eq!(snapshot.incomes[0].withholding_tax, Some(dec!(250_000)));
        assert_eq!(snapshot.computation.expected_refund, dec!(92_255));
        assert_eq!(snapshot.computation.amount_due, dec!(0));
    }

    #[test]
    fn ledger_and_attachments() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let entry = |id: &str, debit: &str, credit: &str, amount| JournalEntry {
            id: id.to_string(),
            date,
            description: "取引".to_string(),
            debit_account: debit.to_string(),
            credit_account: credit.to_string(),
            amount,
            memo: None,
        };
        let entries = vec![
            entry("je-0001", "bank", "capital", dec!(500_000)),
            entry("je-0002", "cash", "sales", dec!(300_000)),
            entry("je-0003", "rent", "cash", dec!(100_000)),
        ];
        let documents = vec![DocumentItem {
            id: "withholding".to_string(),
            label: "源泉徴収票".to_string(),
            status: "verified".to_string(),
            notes: String::new(),
        }];
        let snapshot = assemble(&[], &[], &TaxOverrides::default())
            .with_ledger(&compute_statements(&entries))
            .with_attachments(&documents);

        let j = &snapshot.journal;
        assert_eq!(j.total_sales, dec!(300_000));
        assert_eq!(j.total_expenses, dec!(100_000));
        assert_eq!(j.net_income, dec!(200_000));
        assert_eq!(j.asset_total, dec!(700_000));
        assert_eq!(j.liability_total, dec!(0));
        assert_eq!(j.equity_total, dec!(700_000));
        assert_eq!(snapshot.attachments[0].status, AttachmentStatus::Verified);
        assert!(snapshot.attachments[0].required);
    }

    #[test]
    fn assembly_is_deterministic() {
        let incomes = vec![income("salary", "給与", "4000000")];
        let a = assemble(&incomes, &[], &TaxOverrides::default());
        let b = assemble(&incomes, &[], &TaxOverrides::default());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn stored_snapshot_follows_steps_until_edited() {
        let first = assemble(&[income("salary", "給与", "4000000")], &[], &TaxOverrides::default());
        let second = assemble(&[income("salary", "給与", "4500000")], &[], &TaxOverrides::default());
        let auto = first.fingerprint();

        assert!(should_replace_stored(None, None, &first));
        assert!(!should_replace_stored(Some(&first), Some(&auto), &first));
        assert!(should_replace_stored(Some(&first), Some(&auto), &second));

        let mut edited = first.clone();
        edited.computation.municipal_tax = dec!(123_000);
        assert!(!should_replace_stored(Some(&edited), Some(&auto), &second));
        assert!(!should_replace_stored(Some(&first), None, &second));
    }
}
