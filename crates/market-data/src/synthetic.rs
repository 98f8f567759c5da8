use chrono::{Datelike, Days, NaiveDate, Weekday};
use core_types::PriceTable;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A five-day return cycle shared by every synthetic ticker, standing in for
/// the common market factor. Purely deterministic so fixtures are
/// reproducible run to run.
const MARKET_WAVE: [Decimal; 5] = [
    dec!(0.0015),
    dec!(-0.0010),
    dec!(0.0005),
    dec!(-0.0012),
    dec!(0.0002),
];

/// Describes one fabricated price series.
#[derive(Debug, Clone)]
pub struct SyntheticSeries {
    pub ticker: String,
    pub start_price: Decimal,
    /// Idiosyncratic daily drift, e.g. 0.002 for +20 bps per day.
    pub daily_drift: Decimal,
    /// Loading on the shared market wave; 1.0 tracks it exactly, so a series
    /// with sensitivity `s` estimates to beta ≈ `s` against a 1.0 index.
    pub market_sensitivity: Decimal,
}

impl SyntheticSeries {
    pub fn new(
        ticker: &str,
        start_price: Decimal,
        daily_drift: Decimal,
        market_sensitivity: Decimal,
    ) -> Self {
        Self {
            ticker: ticker.to_string(),
            start_price,
            daily_drift,
            market_sensitivity,
        }
    }
}

/// The first `count` business days starting on or after `start`.
pub fn business_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut date = start;
    while dates.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(date);
        }
        date = date + Days::new(1);
    }
    dates
}

/// Fabricates a deterministic price table over `days` business days: each
/// series compounds its drift plus its loading on the shared market wave.
pub fn trending_prices(series: &[SyntheticSeries], start: NaiveDate, days: usize) -> PriceTable {
    let dates = business_days(start, days);
    let mut table = PriceTable::new();

    for spec in series {
        let mut price = spec.start_price;
        for (day, &date) in dates.iter().enumerate() {
            if day > 0 {
                let wave = MARKET_WAVE[(day - 1) % MARKET_WAVE.len()];
                let daily_return = spec.daily_drift + spec.market_sensitivity * wave;
                price *= Decimal::ONE + daily_return;
            }
            table.insert(date, &spec.ticker, price);
        }
    }

    table
}
