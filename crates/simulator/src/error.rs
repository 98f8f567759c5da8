use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Configuration rejected: {0}")]
    Config(#[from] configuration::ConfigError),

    #[error("Beta calculation failed: {0}")]
    Beta(#[from] beta::BetaError),

    #[error("Rebalancing failed: {0}")]
    Rebalance(#[from] rebalancing::RebalanceError),

    #[error("Position valuation failed: {0}")]
    Valuation(#[from] core_types::CoreError),

    #[error("Price table is empty; nothing to simulate")]
    EmptyPriceTable,

    #[error("No price row for simulation date {0}")]
    MissingPriceRow(NaiveDate),

    #[error("No exchange rate for simulation date {0}; forward-fill the series first")]
    MissingExchangeRate(NaiveDate),

    #[error("No beta for held ticker '{0}'; the target-beta allocation cannot be solved")]
    MissingBeta(String),

    #[error("Average long beta and average short beta sum to zero; the sleeve solve is degenerate")]
    DegenerateSleeveBetas,

    #[error("Return basis value is zero on {0}; a percentage return is undefined")]
    DegenerateReturnBasis(NaiveDate),
}
