use thiserror::Error;

#[derive(Error, Debug)]
pub enum BetaError {
    #[error("Cannot estimate beta from empty return series")]
    EmptyReturns,

    #[error("Return series are misaligned: stock has {stock} points, market has {market}")]
    LengthMismatch { stock: usize, market: usize },

    #[error("Market index '{0}' has no return series")]
    MissingMarketIndex(String),

    #[error("Total portfolio exposure is zero; a weighted average beta is undefined")]
    ZeroTotalExposure,
}
