use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use core_types::{DailyResult, TransactionLogEntry};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TRADING_DAYS_PER_YEAR: Decimal = dec!(252);
const HUNDRED: Decimal = dec!(100);

/// A stateless calculator for deriving performance metrics from a completed
/// simulation run.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `results` - The chronological daily results of a simulation run.
    /// * `transactions` - The flat trade log of the same run.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceReport` or an `AnalyticsError`.
    pub fn calculate(
        &self,
        results: &[DailyResult],
        transactions: &[TransactionLogEntry],
    ) -> Result<PerformanceReport, AnalyticsError> {
        let first = results.first().ok_or_else(|| {
            AnalyticsError::NotEnoughData("no daily results to analyze".to_string())
        })?;
        let last = results.last().unwrap_or(first);

        let returns: Vec<Decimal> = results.iter().map(|day| day.daily_return).collect();
        let index = cumulative_index(&returns);

        let total_return_pct = (index.last().copied().unwrap_or(Decimal::ONE) - Decimal::ONE)
            * HUNDRED;
        let mean_return = returns.iter().sum::<Decimal>() / Decimal::from(returns.len());
        let annualized_return_pct = mean_return * TRADING_DAYS_PER_YEAR * HUNDRED;

        let (annualized_volatility_pct, sharpe_ratio) =
            self.risk_metrics(&returns, mean_return)?;
        let max_drawdown_pct = max_drawdown(&index) * HUNDRED;

        let beta_sum: Decimal = results.iter().map(|day| day.portfolio_beta).sum();
        let average_beta = beta_sum / Decimal::from(results.len());
        let max_abs_beta = results
            .iter()
            .map(|day| day.portfolio_beta.abs())
            .max()
            .unwrap_or(Decimal::ZERO);

        Ok(PerformanceReport {
            period_start: first.date,
            period_end: last.date,
            trading_days: results.len(),
            total_return_pct,
            annualized_return_pct,
            annualized_volatility_pct,
            sharpe_ratio,
            max_drawdown_pct,
            average_beta,
            max_abs_beta,
            total_management_fees: results.iter().map(|day| day.management_fee).sum(),
            total_transaction_costs: results.iter().map(|day| day.transaction_costs).sum(),
            rebalance_count: results.iter().filter(|day| day.rebalanced).count(),
            total_shares_traded: transactions.iter().map(|t| t.shares_traded).sum(),
            final_value_usd: last.portfolio_value_usd,
            final_value_cad: last.portfolio_value_cad,
        })
    }

    /// Annualized volatility and Sharpe ratio from the daily return series.
    ///
    /// Sharpe assumes a zero risk-free rate and is `None` whenever the return
    /// series is too short or has no dispersion.
    fn risk_metrics(
        &self,
        returns: &[Decimal],
        mean_return: Decimal,
    ) -> Result<(Decimal, Option<Decimal>), AnalyticsError> {
        if returns.len() < 2 {
            return Ok((Decimal::ZERO, None));
        }

        let variance: Decimal = returns
            .iter()
            .map(|r| (*r - mean_return) * (*r - mean_return))
            .sum::<Decimal>()
            / Decimal::from(returns.len());

        if variance <= Decimal::ZERO {
            return Ok((Decimal::ZERO, None));
        }

        let std_dev = variance.sqrt().ok_or_else(|| {
            AnalyticsError::InternalError(
                "failed to calculate square root of return variance".to_string(),
            )
        })?;
        let annualization = TRADING_DAYS_PER_YEAR.sqrt().ok_or_else(|| {
            AnalyticsError::InternalError(
                "failed to calculate annualization factor".to_string(),
            )
        })?;

        let annualized_volatility_pct = std_dev * annualization * HUNDRED;
        let sharpe = (mean_return / std_dev) * annualization;
        Ok((annualized_volatility_pct, Some(sharpe)))
    }
}

/// Compounds daily returns into a cumulative index starting at 1.
fn cumulative_index(returns: &[Decimal]) -> Vec<Decimal> {
    let mut index = Vec::with_capacity(returns.len());
    let mut value = Decimal::ONE;
    for r in returns {
        value *= Decimal::ONE + r;
        index.push(value);
    }
    index
}

/// Largest fractional peak-to-trough decline of the index.
fn max_drawdown(index: &[Decimal]) -> Decimal {
    let mut max_drawdown = Decimal::ZERO;
    let Some(&first) = index.first() else {
        return max_drawdown;
    };
    let mut peak = first;

    for &value in index {
        if value > peak {
            peak = value;
        }
        if peak > Decimal::ZERO {
            let drawdown = (peak - value) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    max_drawdown
}
