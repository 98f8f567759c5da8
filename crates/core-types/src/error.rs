use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No price for held ticker '{ticker}' on {date}")]
    MissingPrice { ticker: String, date: NaiveDate },
}
