use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to read market data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: cannot parse column '{column}' from value '{value}'")]
    ParseField {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Duplicate trading date {0} in price file")]
    DuplicateDate(NaiveDate),

    #[error("Non-positive price {price} for '{ticker}' on {date}")]
    NonPositivePrice {
        ticker: String,
        date: NaiveDate,
        price: String,
    },

    #[error("Price table has a gap for '{ticker}' on {date} after filling")]
    IncompleteSeries { ticker: String, date: NaiveDate },

    #[error("Required ticker '{0}' is missing from the price table")]
    MissingTicker(String),

    #[error("Price table covers {actual} trading days; at least {required} are required")]
    NotEnoughHistory { required: usize, actual: usize },

    #[error("Price table is empty")]
    EmptyTable,

    #[error("No exchange rate on or before {0}; the series cannot be forward-filled")]
    UncoveredRateDate(NaiveDate),
}
