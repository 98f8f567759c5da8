use crate::error::BetaError;
use core_types::BetaMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Calculates a beta coefficient from paired daily return series.
///
/// Beta is Cov(stock, market) / Var(market) over the full window. The two
/// series must be date-aligned and of equal length; the first element may be
/// 0 for the undefined first-day return.
///
/// Returns 0 when the market variance is exactly zero. That is a policy
/// choice for the degenerate flat-market case, not a numerical accident.
pub fn compute_beta(
    stock_returns: &[Decimal],
    market_returns: &[Decimal],
) -> Result<Decimal, BetaError> {
    if stock_returns.is_empty() || market_returns.is_empty() {
        return Err(BetaError::EmptyReturns);
    }
    if stock_returns.len() != market_returns.len() {
        return Err(BetaError::LengthMismatch {
            stock: stock_returns.len(),
            market: market_returns.len(),
        });
    }

    let n = Decimal::from(stock_returns.len());
    let stock_mean: Decimal = stock_returns.iter().sum::<Decimal>() / n;
    let market_mean: Decimal = market_returns.iter().sum::<Decimal>() / n;

    let mut covariance = Decimal::ZERO;
    let mut market_variance = Decimal::ZERO;
    for (stock, market) in stock_returns.iter().zip(market_returns.iter()) {
        let market_dev = market - market_mean;
        covariance += (stock - stock_mean) * market_dev;
        market_variance += market_dev * market_dev;
    }

    // The 1/n factors cancel in the ratio, so the raw sums are used directly.
    if market_variance.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Ok(covariance / market_variance)
}

/// Estimates a beta for every ticker in a returns table against the market
/// index column, which is itself excluded from the result.
pub fn estimate_betas(
    returns: &BTreeMap<String, Vec<Decimal>>,
    market_index: &str,
) -> Result<BetaMap, BetaError> {
    let market_returns = returns
        .get(market_index)
        .ok_or_else(|| BetaError::MissingMarketIndex(market_index.to_string()))?;

    let mut betas = BetaMap::new();
    for (ticker, series) in returns {
        if ticker == market_index {
            continue;
        }
        betas.insert(ticker, compute_beta(series, market_returns)?);
    }
    Ok(betas)
}
