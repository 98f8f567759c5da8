use crate::error::MarketDataError;
use chrono::NaiveDate;
use core_types::PriceTable;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Loads a wide-format price CSV: a `date` column followed by one column per
/// ticker. Empty cells are missing prices, to be repaired by `fill_missing`.
pub fn load_price_table(path: &Path) -> Result<PriceTable, MarketDataError> {
    let file = std::fs::File::open(path)?;
    read_price_table(file)
}

/// Parses wide-format price CSV from any reader. See `load_price_table`.
pub fn read_price_table<R: Read>(reader: R) -> Result<PriceTable, MarketDataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut table = PriceTable::new();
    let mut seen_dates = BTreeSet::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 2; // header occupies line 1

        let raw_date = record.get(0).unwrap_or("");
        let date = NaiveDate::from_str(raw_date).map_err(|_| MarketDataError::ParseField {
            row,
            column: "date".to_string(),
            value: raw_date.to_string(),
        })?;
        if !seen_dates.insert(date) {
            return Err(MarketDataError::DuplicateDate(date));
        }

        for (column, ticker) in headers.iter().enumerate().skip(1) {
            let raw = record.get(column).unwrap_or("");
            if raw.is_empty() {
                continue;
            }
            let price = Decimal::from_str(raw).map_err(|_| MarketDataError::ParseField {
                row,
                column: ticker.to_string(),
                value: raw.to_string(),
            })?;
            table.insert(date, ticker, price);
        }
    }

    if table.is_empty() {
        return Err(MarketDataError::EmptyTable);
    }
    Ok(table)
}

/// Repairs gaps by filling each ticker's series forward, then backward for
/// any leading gap. Every fill is a data-quality event and is logged.
///
/// This runs *before* validation; the core itself never sees a gap.
pub fn fill_missing(table: &PriceTable) -> PriceTable {
    let dates: Vec<NaiveDate> = table.dates().copied().collect();
    let tickers = table.tickers();
    let mut filled = table.clone();

    for ticker in &tickers {
        let mut last_known: Option<Decimal> = None;
        let mut forward_fills = 0usize;
        for &date in &dates {
            match table.price(date, ticker) {
                Some(price) => last_known = Some(price),
                None => {
                    if let Some(price) = last_known {
                        filled.insert(date, ticker, price);
                        forward_fills += 1;
                    }
                }
            }
        }

        // Backward fill: a leading gap takes the first observed price.
        let mut next_known: Option<Decimal> = None;
        let mut backward_fills = 0usize;
        for &date in dates.iter().rev() {
            match filled.price(date, ticker) {
                Some(price) => next_known = Some(price),
                None => {
                    if let Some(price) = next_known {
                        filled.insert(date, ticker, price);
                        backward_fills += 1;
                    }
                }
            }
        }

        if forward_fills + backward_fills > 0 {
            warn!(
                ticker = %ticker,
                forward_fills,
                backward_fills,
                "filled missing prices"
            );
        }
    }

    filled
}

/// Validates the preprocessing contract the simulation core relies on:
/// a non-empty table with enough history, strictly positive prices, and a
/// price for every required ticker on every date.
///
/// Date ordering and uniqueness hold by construction of `PriceTable`.
pub fn validate_price_table(
    table: &PriceTable,
    required_tickers: &[String],
    min_trading_days: usize,
) -> Result<(), MarketDataError> {
    if table.is_empty() {
        return Err(MarketDataError::EmptyTable);
    }
    if table.len() < min_trading_days {
        return Err(MarketDataError::NotEnoughHistory {
            required: min_trading_days,
            actual: table.len(),
        });
    }

    let tickers = table.tickers();
    for required in required_tickers {
        if !tickers.contains(required) {
            return Err(MarketDataError::MissingTicker(required.clone()));
        }
    }

    for (date, row) in table.rows() {
        for (ticker, price) in row {
            if *price <= Decimal::ZERO {
                return Err(MarketDataError::NonPositivePrice {
                    ticker: ticker.clone(),
                    date: *date,
                    price: price.to_string(),
                });
            }
        }
        for required in required_tickers {
            if !row.contains_key(required) {
                return Err(MarketDataError::IncompleteSeries {
                    ticker: required.clone(),
                    date: *date,
                });
            }
        }
    }

    Ok(())
}
