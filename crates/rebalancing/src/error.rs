use thiserror::Error;

#[derive(Error, Debug)]
pub enum RebalanceError {
    #[error("Position valuation failed: {0}")]
    Valuation(#[from] core_types::CoreError),

    #[error("Beta aggregation failed: {0}")]
    Beta(#[from] beta::BetaError),
}
