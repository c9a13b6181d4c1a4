use chrono::{DateTime, NaiveDate, NaiveDateTime};
use kakutei_derive::CsvSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("not enough inventory to sell: trade {trade_id} sells {requested}, holding {available}")]
    InsufficientInventory {
        trade_id: String,
        available: Decimal,
        requested: Decimal,
    },
    #[error("invalid trade date '{date}': {trade_id}")]
    InvalidTradeDate { trade_id: String, date: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    #[default]
    Buy,
    Sell,
}

impl TradeSide {
    /// `sell` in any case is a sale; everything else is treated as a purchase.
    pub fn parse_lenient(s: &str) -> TradeSide {
        if s.trim().eq_ignore_ascii_case("sell") {
            TradeSide::Sell
        } else {
            TradeSide::Buy
        }
    }
}

/// A single exchange fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, CsvSchema)]
#[serde(rename_all = "camelCase")]
pub struct CryptoTrade {
    #[csv(skip)]
    pub id: String,
    /// Trade date (YYYY-MM-DD or ISO 8601 date-time)
    pub date: String,
    /// Trading pair (e.g. BTC/JPY)
    pub pair: String,
    /// buy or sell
    pub side: TradeSide,
    /// Quantity of the base asset
    #[schemars(with = "String")]
    pub quantity: Decimal,
    /// Unit price in yen
    #[schemars(with = "String")]
    pub price: Decimal,
    /// Fee in yen
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub fee: Option<Decimal>,
}

impl CryptoTrade {
    /// `quantity × price + fee`. The fee is added on both sides.
    pub fn value(&self) -> Decimal {
        self.quantity * self.price + self.fee.unwrap_or(Decimal::ZERO)
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_trade_datetime(&self.date)
    }
}

/// Parse an ISO date or date-time. Offsets are normalized to UTC.
pub fn parse_trade_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Average-cost inventory across every trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory {
    pub quantity: Decimal,
    pub cost: Decimal,
}

impl Inventory {
    pub fn add(&mut self, quantity: Decimal, cost: Decimal) {
        self.quantity += quantity;
        self.cost += cost;
        log::debug!(
            "Inventory ADD: qty={}, cost={}. New total: qty={}, cost={}",
            quantity,
            cost,
            self.quantity,
            self.cost
        );
    }

    pub fn average_cost(&self) -> Decimal {
        self.cost.checked_div(self.quantity).unwrap_or(Decimal::ZERO)
    }

    /// Remove `quantity` at average cost and return its cost basis.
    ///
    /// The remaining cost is recomputed as `average × remaining quantity`
    /// rather than `cost − basis`. Callers must check the quantity first.
    fn remove(&mut self, quantity: Decimal) -> Decimal {
        let average = self.average_cost();
        let cost_basis = average * quantity;
        self.quantity -= quantity;
        self.cost = average * self.quantity;
        log::debug!(
            "Inventory REMOVE: qty={}, basis={}. Remaining: qty={}, cost={}",
            quantity,
            cost_basis,
            self.quantity,
            self.cost
        );
        cost_basis
    }
}

/// Gain or loss realized by one sell trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoDisposal {
    pub trade_id: String,
    pub date: String,
    pub pair: String,
    pub quantity: Decimal,
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub gain: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoPnl {
    pub realized: Decimal,
    pub remaining_quantity: Decimal,
    pub remaining_cost: Decimal,
    pub disposals: Vec<CryptoDisposal>,
}

/// Realized profit and loss under the average-cost method (総平均法).
///
/// Trades are processed in date order; trades on the same instant keep
/// their input order. Selling more than is held aborts the calculation.
pub fn calculate_crypto_pnl(trades: &[CryptoTrade]) -> Result<CryptoPnl, CryptoError> {
    let mut ordered = trades
        .iter()
        .map(|t| {
            t.timestamp()
                .map(|ts| (ts, t))
                .ok_or_else(|| CryptoError::InvalidTradeDate {
                    trade_id: t.id.clone(),
                    date: t.date.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    ordered.sort_by_key(|(ts, _)| *ts);

    let mut inventory = Inventory::default();
    let mut realized = Decimal::ZERO;
    let mut disposals = Vec::new();

    for (_, trade) in ordered {
        match trade.side {
            TradeSide::Buy => inventory.add(trade.quantity, trade.value()),
            TradeSide::Sell => {
                if inventory.quantity < trade.quantity {
                    return Err(CryptoError::InsufficientInventory {
                        trade_id: trade.id.clone(),
                        available: inventory.quantity,
                        requested: trade.quantity,
                    });
                }
                let cost_basis = inventory.remove(trade.quantity);
                let proceeds = trade.value();
                let gain = proceeds - cost_basis;
                realized += gain;
                disposals.push(CryptoDisposal {
                    trade_id: trade.id.clone(),
                    date: trade.date.clone(),
                    pair: trade.pair.clone(),
                    quantity: trade.quantity,
                    proceeds,
                    cost_basis,
                    gain,
                });
            }
        }
    }

    Ok(CryptoPnl {
        realized,
        remaining_quantity: inventory.quantity,
        remaining_cost: inventory.cost,
        disposals,
    })
}
