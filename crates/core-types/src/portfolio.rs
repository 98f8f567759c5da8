use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed share positions, keyed by ticker. Positive shares are long,
/// negative shares are short.
///
/// Iteration order is the ticker's lexical order, so trade logs and rounding
/// are applied deterministically across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    positions: BTreeMap<String, Decimal>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: &str, shares: Decimal) {
        self.positions.insert(ticker.to_string(), shares);
    }

    /// The signed share count for a ticker; zero if the ticker is not held.
    pub fn shares(&self, ticker: &str) -> Decimal {
        self.positions.get(ticker).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.positions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Decimal)> {
        self.positions.iter_mut()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &String> {
        self.positions.keys()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Values every position at the given prices: shares × price, signed.
    ///
    /// A held ticker without a price is a hard error; the caller cannot value
    /// an untraded position and must not guess.
    pub fn position_values(
        &self,
        prices: &BTreeMap<String, Decimal>,
        date: NaiveDate,
    ) -> Result<BTreeMap<String, Decimal>, CoreError> {
        let mut values = BTreeMap::new();
        for (ticker, shares) in &self.positions {
            let price = prices.get(ticker).ok_or_else(|| CoreError::MissingPrice {
                ticker: ticker.clone(),
                date,
            })?;
            values.insert(ticker.clone(), shares * price);
        }
        Ok(values)
    }
}

impl FromIterator<(String, Decimal)> for Portfolio {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

/// Sum of absolute position values: total capital at risk regardless of
/// direction.
pub fn gross_exposure(values: &BTreeMap<String, Decimal>) -> Decimal {
    values.values().map(|v| v.abs()).sum()
}

/// Signed sum of position values; near zero for a market-neutral book.
pub fn net_value(values: &BTreeMap<String, Decimal>) -> Decimal {
    values.values().sum()
}

/// One record per simulated day, appended by the simulation loop and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    pub date: NaiveDate,
    /// Net (signed) portfolio value in USD.
    pub portfolio_value_usd: Decimal,
    pub gross_exposure_usd: Decimal,
    /// Net portfolio value converted at the day's stored exchange rate.
    pub portfolio_value_cad: Decimal,
    /// Portfolio beta measured before any rebalancing trade that day.
    pub portfolio_beta: Decimal,
    /// Percentage change of the configured return basis vs. the prior day;
    /// zero on the first day.
    pub daily_return: Decimal,
    pub management_fee: Decimal,
    pub transaction_costs: Decimal,
    pub rebalanced: bool,
    pub exchange_rate: Decimal,
}

/// One trade leg, recorded when rebalancing executes or when the opening
/// positions are established.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLogEntry {
    pub date: NaiveDate,
    pub ticker: String,
    /// Unsigned magnitude of shares traded.
    pub shares_traded: Decimal,
    pub price: Decimal,
    /// Portfolio beta measured before the trade.
    pub portfolio_beta: Decimal,
    pub transaction_cost: Decimal,
}
