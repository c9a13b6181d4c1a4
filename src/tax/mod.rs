pub mod brackets;
pub mod crypto;
pub mod housing;
pub mod medical;

pub use brackets::{resolve_bracket, Bracket, BracketResult, ConfigError, TaxConfig};
pub use crypto::{calculate_crypto_pnl, CryptoDisposal, CryptoError, CryptoPnl, CryptoTrade, TradeSide};
pub use housing::{calculate_housing_loan_deduction, HousingLoanRecord};
pub use medical::{calculate_medical_deduction, MedicalDeduction, MedicalExpenseEntry};
