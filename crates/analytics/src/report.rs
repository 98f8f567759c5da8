use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A standardized report of a simulation run's performance.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// data transfer object for performance results throughout the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Period
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub trading_days: usize,

    // II. Return Metrics
    /// Compound return over the whole period, in percent.
    pub total_return_pct: Decimal,
    /// Mean daily return scaled to 252 trading days, in percent.
    pub annualized_return_pct: Decimal,

    // III. Risk Metrics
    /// Standard deviation of daily returns scaled by sqrt(252), in percent.
    pub annualized_volatility_pct: Decimal,
    pub sharpe_ratio: Option<Decimal>, // Option<> for cases with no stdev
    /// Largest peak-to-trough decline of the cumulative return index, in
    /// percent.
    pub max_drawdown_pct: Decimal,
    /// Mean of the daily pre-trade portfolio betas.
    pub average_beta: Decimal,
    pub max_abs_beta: Decimal,

    // IV. Cost and Activity Metrics
    pub total_management_fees: Decimal,
    pub total_transaction_costs: Decimal,
    pub rebalance_count: usize,
    pub total_shares_traded: Decimal,

    // V. Final Valuations
    pub final_value_usd: Decimal,
    pub final_value_cad: Decimal,
}
