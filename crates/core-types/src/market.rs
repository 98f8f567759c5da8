use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Daily close prices, ordered by trading date.
///
/// Each row maps ticker symbol to a positive USD price. The `BTreeMap` keys
/// give the strictly increasing business-day sequence the simulation walks;
/// duplicate dates cannot exist by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    rows: BTreeMap<NaiveDate, BTreeMap<String, Decimal>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, ticker: &str, price: Decimal) {
        self.rows
            .entry(date)
            .or_default()
            .insert(ticker.to_string(), price);
    }

    pub fn price(&self, date: NaiveDate, ticker: &str) -> Option<Decimal> {
        self.rows.get(&date).and_then(|row| row.get(ticker)).copied()
    }

    pub fn row(&self, date: NaiveDate) -> Option<&BTreeMap<String, Decimal>> {
        self.rows.get(&date)
    }

    /// Iterates rows in chronological order.
    pub fn rows(&self) -> impl Iterator<Item = (&NaiveDate, &BTreeMap<String, Decimal>)> {
        self.rows.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.rows.keys()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    /// Every ticker that appears on at least one date.
    pub fn tickers(&self) -> BTreeSet<String> {
        self.rows
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect()
    }

    /// Number of trading days in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<(NaiveDate, BTreeMap<String, Decimal>)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, BTreeMap<String, Decimal>)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Per-ticker market beta coefficients, static for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetaMap {
    betas: BTreeMap<String, Decimal>,
}

impl BetaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: &str, beta: Decimal) {
        self.betas.insert(ticker.to_string(), beta);
    }

    pub fn get(&self, ticker: &str) -> Option<Decimal> {
        self.betas.get(ticker).copied()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.betas.contains_key(ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.betas.iter()
    }

    pub fn len(&self) -> usize {
        self.betas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.betas.is_empty()
    }
}

impl FromIterator<(String, Decimal)> for BetaMap {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self {
            betas: iter.into_iter().collect(),
        }
    }
}

/// Daily USD/CAD rates, ordered by date.
///
/// Used only to present USD results in CAD; rates never influence a trading
/// decision. The series must cover every simulation date before the loop
/// starts (forward-filling is a preprocessing responsibility).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSeries {
    rates: BTreeMap<NaiveDate, Decimal>,
}

impl ExchangeRateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, rate: Decimal) {
        self.rates.insert(date, rate);
    }

    pub fn rate(&self, date: NaiveDate) -> Option<Decimal> {
        self.rates.get(&date).copied()
    }

    /// The most recent rate on or before `date`, used for forward-filling.
    pub fn rate_on_or_before(&self, date: NaiveDate) -> Option<Decimal> {
        self.rates
            .range(..=date)
            .next_back()
            .map(|(_, rate)| *rate)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Decimal)> {
        self.rates.iter()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(NaiveDate, Decimal)> for ExchangeRateSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
