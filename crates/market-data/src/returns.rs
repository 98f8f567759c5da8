use crate::error::MarketDataError;
use core_types::PriceTable;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Computes daily fractional returns for every ticker in the table.
///
/// The first day's return is defined as 0 (no prior reference). The table
/// must already be filled and validated; any remaining gap is an error, not
/// something to paper over here.
pub fn daily_returns(
    table: &PriceTable,
) -> Result<BTreeMap<String, Vec<Decimal>>, MarketDataError> {
    let mut returns: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();

    for ticker in table.tickers() {
        let mut series = Vec::with_capacity(table.len());
        let mut previous: Option<Decimal> = None;
        for (date, row) in table.rows() {
            let price = row
                .get(&ticker)
                .copied()
                .ok_or_else(|| MarketDataError::IncompleteSeries {
                    ticker: ticker.clone(),
                    date: *date,
                })?;
            match previous {
                Some(prior) => series.push(price / prior - Decimal::ONE),
                None => series.push(Decimal::ZERO),
            }
            previous = Some(price);
        }
        returns.insert(ticker, series);
    }

    Ok(returns)
}
