use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    /// Liabilities, equity and revenue carry credit balances, which are
    /// negative in the raw ledger and negated for display.
    pub fn is_credit_normal(self) -> bool {
        matches!(
            self,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue
        )
    }

    pub fn display(self) -> &'static str {
        match self {
            AccountType::Asset => "資産",
            AccountType::Liability => "負債",
            AccountType::Equity => "純資産",
            AccountType::Revenue => "収益",
            AccountType::Expense => "費用",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

impl Account {
    pub fn new(id: &str, name: &str, account_type: AccountType) -> Self {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            account_type,
        }
    }
}

/// Orders accounts by display name under the Japanese (`ja`) collation.
pub struct NameCollator(Option<Collator>);

impl NameCollator {
    pub fn japanese() -> Self {
        match Collator::try_new(&locale!("ja").into(), CollatorOptions::new()) {
            Ok(collator) => NameCollator(Some(collator)),
            Err(e) => {
                log::warn!("ja collation unavailable, sorting by code point: {:?}", e);
                NameCollator(None)
            }
        }
    }

    pub fn compare(&self, a: &Account, b: &Account) -> Ordering {
        match &self.0 {
            Some(collator) => collator.compare(&a.name, &b.name),
            None => a.name.cmp(&b.name),
        }
    }
}

/// Reference set of accounts. Entries are only ever looked up in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChartOfAccounts {
    accounts: Vec<Account>,
}

impl ChartOfAccounts {
    pub fn new(accounts: Vec<Account>) -> Self {
        ChartOfAccounts { accounts }
    }

    /// The sole-proprietor chart used for blue returns (青色申告).
    pub fn standard() -> Self {
        use AccountType::*;
        ChartOfAccounts::new(vec![
            Account::new("cash", "現金", Asset),
            Account::new("bank", "普通預金", Asset),
            Account::new("accounts_receivable", "売掛金", Asset),
            Account::new("inventory", "棚卸資産", Asset),
            Account::new("equipment", "備品", Asset),
            Account::new("accounts_payable", "買掛金", Liability),
            Account::new("accrued_expenses", "未払費用", Liability),
            Account::new("short_term_loans", "短期借入金", Liability),
            Account::new("long_term_loans", "長期借入金", Liability),
            Account::new("capital", "元入金", Equity),
            Account::new("retained_earnings", "前期繰越利益", Equity),
            Account::new("sales", "売上高", Revenue),
            Account::new("service_revenue", "役務提供収益", Revenue),
            Account::new("interest_income", "受取利息", Revenue),
            Account::new("cogs", "売上原価", Expense),
            Account::new("rent", "地代家賃", Expense),
            Account::new("utilities", "水道光熱費", Expense),
            Account::new("salary", "給料賃金", Expense),
            Account::new("misc_expense", "雑費", Expense),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn of_type(&self, account_type: AccountType) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(move |a| a.account_type == account_type)
    }
}

impl Default for ChartOfAccounts {
    fn default() -> Self {
        ChartOfAccounts::standard()
    }
}
