use crate::error::MarketDataError;
use chrono::NaiveDate;
use core_types::ExchangeRateSeries;
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Builds a constant-rate series covering the given dates. Used when no real
/// rate source is wired in; presentation-only, never a trading input.
pub fn constant_rates<I>(dates: I, rate: Decimal) -> ExchangeRateSeries
where
    I: IntoIterator<Item = NaiveDate>,
{
    dates.into_iter().map(|date| (date, rate)).collect()
}

/// Loads a two-column `date,rate` CSV into an `ExchangeRateSeries`.
pub fn load_rate_series(path: &Path) -> Result<ExchangeRateSeries, MarketDataError> {
    let file = std::fs::File::open(path)?;
    read_rate_series(file)
}

fn read_rate_series<R: Read>(reader: R) -> Result<ExchangeRateSeries, MarketDataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut series = ExchangeRateSeries::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 2;

        let raw_date = record.get(0).unwrap_or("");
        let date = NaiveDate::from_str(raw_date).map_err(|_| MarketDataError::ParseField {
            row,
            column: "date".to_string(),
            value: raw_date.to_string(),
        })?;

        let raw_rate = record.get(1).unwrap_or("");
        let rate = Decimal::from_str(raw_rate).map_err(|_| MarketDataError::ParseField {
            row,
            column: "rate".to_string(),
            value: raw_rate.to_string(),
        })?;

        series.insert(date, rate);
    }

    Ok(series)
}

/// Produces a series with an exact rate for every simulation date, carrying
/// the most recent prior rate across gaps. A date before the first observed
/// rate cannot be filled and is an error.
pub fn forward_fill_rates(
    series: &ExchangeRateSeries,
    dates: &[NaiveDate],
) -> Result<ExchangeRateSeries, MarketDataError> {
    let mut filled = ExchangeRateSeries::new();
    for &date in dates {
        let rate = series
            .rate_on_or_before(date)
            .ok_or(MarketDataError::UncoveredRateDate(date))?;
        filled.insert(date, rate);
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn forward_fill_carries_the_last_rate() {
        let series: ExchangeRateSeries = [
            (d("2025-01-02"), dec!(1.35)),
            (d("2025-01-06"), dec!(1.36)),
        ]
        .into_iter()
        .collect();
        let dates = vec![d("2025-01-02"), d("2025-01-03"), d("2025-01-06")];

        let filled = forward_fill_rates(&series, &dates).unwrap();
        assert_eq!(filled.rate(d("2025-01-03")), Some(dec!(1.35)));
        assert_eq!(filled.rate(d("2025-01-06")), Some(dec!(1.36)));
    }

    #[test]
    fn uncovered_leading_date_is_an_error() {
        let series: ExchangeRateSeries =
            [(d("2025-01-06"), dec!(1.36))].into_iter().collect();
        let err = forward_fill_rates(&series, &[d("2025-01-02")]).unwrap_err();
        assert!(matches!(err, MarketDataError::UncoveredRateDate(_)));
    }

    #[test]
    fn reads_two_column_rate_csv() {
        let csv = "date,rate\n2025-01-02,1.35\n2025-01-03,1.3550\n";
        let series = read_rate_series(csv.as_bytes()).unwrap();
        assert_eq!(series.rate(d("2025-01-03")), Some(dec!(1.3550)));
    }

    #[test]
    fn constant_series_covers_every_date() {
        let dates = vec![d("2025-01-02"), d("2025-01-03")];
        let series = constant_rates(dates.clone(), dec!(1.35));
        for date in dates {
            assert_eq!(series.rate(date), Some(dec!(1.35)));
        }
    }
}
