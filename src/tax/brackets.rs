use crate::money::round_yen;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bracket table is empty")]
    EmptyBrackets,
    #[error("bracket thresholds must be strictly ascending: {previous} then {threshold}")]
    UnsortedBrackets { previous: Decimal, threshold: Decimal },
    #[error("negative rate in tax configuration: {0}")]
    NegativeRate(Decimal),
}

/// One row of the progressive rate table.
///
/// Income at or above `threshold` is taxed as
/// `income × rate − subtracted_amount` (the quick-calculation form used on
/// the national tax agency's table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    #[schemars(with = "String")]
    pub threshold: Decimal,
    #[schemars(with = "String")]
    pub rate: Decimal,
    #[schemars(with = "String")]
    pub subtracted_amount: Decimal,
}

impl Bracket {
    pub const fn new(threshold: Decimal, rate: Decimal, subtracted_amount: Decimal) -> Self {
        Bracket {
            threshold,
            rate,
            subtracted_amount,
        }
    }
}

/// Income tax rate table plus the reconstruction surtax rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxConfig {
    pub brackets: Vec<Bracket>,
    #[serde(default = "default_surtax_rate")]
    #[schemars(with = "String")]
    pub surtax_rate: Decimal,
}

fn default_surtax_rate() -> Decimal {
    dec!(0.021)
}

impl Default for TaxConfig {
    fn default() -> Self {
        TaxConfig {
            brackets: vec![
                Bracket::new(dec!(0), dec!(0.05), dec!(0)),
                Bracket::new(dec!(1_950_000), dec!(0.10), dec!(97_500)),
                Bracket::new(dec!(3_300_000), dec!(0.20), dec!(427_500)),
                Bracket::new(dec!(6_950_000), dec!(0.23), dec!(636_000)),
                Bracket::new(dec!(9_000_000), dec!(0.33), dec!(1_536_000)),
                Bracket::new(dec!(18_000_000), dec!(0.40), dec!(2_796_000)),
                Bracket::new(dec!(40_000_000), dec!(0.45), dec!(4_796_000)),
            ],
            surtax_rate: default_surtax_rate(),
        }
    }
}

impl TaxConfig {
    /// Read a configuration from JSON and validate it.
    pub fn from_json<R: Read>(reader: R) -> anyhow::Result<Self> {
        let config: TaxConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.brackets.is_empty() {
            return Err(ConfigError::EmptyBrackets);
        }
        if self.surtax_rate.is_sign_negative() {
            return Err(ConfigError::NegativeRate(self.surtax_rate));
        }
        for pair in self.brackets.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ConfigError::UnsortedBrackets {
                    previous: pair[0].threshold,
                    threshold: pair[1].threshold,
                });
            }
        }
        if let Some(b) = self.brackets.iter().find(|b| b.rate.is_sign_negative()) {
            return Err(ConfigError::NegativeRate(b.rate));
        }
        Ok(())
    }

    /// Highest bracket whose threshold is at or below `taxable_income`.
    pub fn bracket_for(&self, taxable_income: Decimal) -> Option<&Bracket> {
        self.brackets
            .iter()
            .rev()
            .find(|b| taxable_income >= b.threshold)
    }
}

/// Income tax and reconstruction surtax for a taxable income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketResult {
    pub income_tax: Decimal,
    pub surtax: Decimal,
}

impl BracketResult {
    pub fn total(&self) -> Decimal {
        self.income_tax + self.surtax
    }
}

/// Resolve income tax and surtax on `taxable_income`.
///
/// Zero or negative income short-circuits to zero without a table lookup.
pub fn resolve_bracket(taxable_income: Decimal, config: &TaxConfig) -> BracketResult {
    if taxable_income <= Decimal::ZERO {
        return BracketResult::default();
    }

    let income_tax = match config.bracket_for(taxable_income) {
        Some(bracket) => {
            let raw = taxable_income * bracket.rate - bracket.subtracted_amount;
            round_yen(raw.max(Decimal::ZERO))
        }
        None => Decimal::ZERO,
    };
    let surtax = round_yen(income_tax * config.surtax_rate);

    log::debug!(
        "resolve_bracket: taxable={}, income_tax={}, surtax={}",
        taxable_income,
        income_tax,
        surtax
    );

    BracketResult { income_tax, surtax }
}
