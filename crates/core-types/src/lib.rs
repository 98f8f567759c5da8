pub mod enums;
pub mod error;
pub mod market;
pub mod portfolio;

// Re-export the core types to provide a clean public API.
pub use enums::{AllocationPolicy, RebalanceStrategyId, ReturnBasis, ShareRounding};
pub use error::CoreError;
pub use market::{BetaMap, ExchangeRateSeries, PriceTable};
pub use portfolio::{
    gross_exposure, net_value, DailyResult, Portfolio, TransactionLogEntry,
};
