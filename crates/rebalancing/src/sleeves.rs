//! Shared sleeve arithmetic for the rebalancing strategies.

use crate::error::RebalanceError;
use crate::{RebalanceOutcome, RebalanceParams};
use beta::compute_portfolio_beta;
use chrono::NaiveDate;
use core_types::{gross_exposure, BetaMap, Portfolio, TransactionLogEntry};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tracing::debug;

/// Fraction of the beta correction absorbed by the sleeve with the
/// larger-magnitude beta contribution. The higher-sensitivity sleeve converges
/// faster, so it takes the bigger slice. Tunable, not a derived optimum.
const MAJOR_SLEEVE_SHARE: Decimal = dec!(0.6);
const MINOR_SLEEVE_SHARE: Decimal = dec!(0.4);

/// Applies one fractional correction step toward `target_beta` and returns
/// the adjusted (un-rounded) portfolio together with the measured pre-step
/// beta. `scale` damps the correction; 1 means a full step.
///
/// The required adjustment (target - current) is split 60/40 between the
/// sleeves, the larger-magnitude beta contributor taking 60%. Within a
/// sleeve, each ticker's beta contribution moves proportionally to its
/// existing contribution, which works out to a uniform multiplicative share
/// factor of (1 + sleeve_adjustment / sleeve_beta).
///
/// Guards: a sleeve whose beta contribution is exactly zero receives no
/// distribution (the correction cannot be expressed through it), and
/// zero-beta or unmapped tickers are left untouched, since scaling them cannot
/// move the numerator of the portfolio beta, only distort total exposure.
pub(crate) fn correction_step(
    portfolio: &Portfolio,
    prices: &BTreeMap<String, Decimal>,
    betas: &BetaMap,
    date: NaiveDate,
    target_beta: Decimal,
    scale: Decimal,
) -> Result<(Portfolio, Decimal), RebalanceError> {
    let values = portfolio.position_values(prices, date)?;
    let current_beta = compute_portfolio_beta(&values, betas)?;
    let total_exposure = gross_exposure(&values);

    // Each sleeve's beta contribution, normalized by the exposure of the
    // whole book, not just the sleeve itself.
    let mut long_beta = Decimal::ZERO;
    let mut short_beta = Decimal::ZERO;
    for (ticker, value) in &values {
        let Some(ticker_beta) = betas.get(ticker) else {
            continue;
        };
        let contribution = ticker_beta * value / total_exposure;
        let shares = portfolio.shares(ticker);
        if shares > Decimal::ZERO {
            long_beta += contribution;
        } else if shares < Decimal::ZERO {
            short_beta += contribution;
        }
    }

    if long_beta.is_zero() {
        debug!(%date, "long sleeve has zero beta contribution; it receives no correction");
    }
    if short_beta.is_zero() {
        debug!(%date, "short sleeve has zero beta contribution; it receives no correction");
    }

    let delta = (target_beta - current_beta) * scale;
    let (long_adjustment, short_adjustment) = if long_beta.abs() >= short_beta.abs() {
        (delta * MAJOR_SLEEVE_SHARE, delta * MINOR_SLEEVE_SHARE)
    } else {
        (delta * MINOR_SLEEVE_SHARE, delta * MAJOR_SLEEVE_SHARE)
    };

    let mut adjusted = Portfolio::new();
    for (ticker, shares) in portfolio.iter() {
        let new_shares = if shares.is_zero() {
            *shares
        } else {
            let (sleeve_beta, sleeve_adjustment) = if *shares > Decimal::ZERO {
                (long_beta, long_adjustment)
            } else {
                (short_beta, short_adjustment)
            };
            match betas.get(ticker) {
                None => *shares,
                Some(b) if b.is_zero() => *shares,
                Some(_) if sleeve_beta.is_zero() => *shares,
                Some(_) => shares * (Decimal::ONE + sleeve_adjustment / sleeve_beta),
            }
        };
        adjusted.insert(ticker, new_shares);
    }

    Ok((adjusted, current_beta))
}

/// Rounds an adjusted portfolio per the configured convention and produces
/// the final outcome: per-leg traded magnitudes, per-share costs, and one
/// trade-log entry for every ticker whose share count actually changed.
pub(crate) fn settle(
    original: &Portfolio,
    adjusted: &Portfolio,
    prices: &BTreeMap<String, Decimal>,
    pre_trade_beta: Decimal,
    date: NaiveDate,
    params: &RebalanceParams,
) -> Result<RebalanceOutcome, RebalanceError> {
    let mut new_portfolio = Portfolio::new();
    let mut trades = Vec::new();
    let mut total_cost = Decimal::ZERO;

    for (ticker, shares) in adjusted.iter() {
        let rounded = params.rounding.apply(*shares);
        let traded = (rounded - original.shares(ticker)).abs();
        if traded > Decimal::ZERO {
            let price = prices.get(ticker).copied().ok_or_else(|| {
                core_types::CoreError::MissingPrice {
                    ticker: ticker.clone(),
                    date,
                }
            })?;
            let leg_cost = traded * params.fee_per_share;
            total_cost += leg_cost;
            trades.push(TransactionLogEntry {
                date,
                ticker: ticker.clone(),
                shares_traded: traded,
                price,
                portfolio_beta: pre_trade_beta,
                transaction_cost: leg_cost,
            });
        }
        new_portfolio.insert(ticker, rounded);
    }

    Ok(RebalanceOutcome {
        portfolio: new_portfolio,
        rebalanced: true,
        pre_trade_beta,
        transaction_cost: total_cost,
        trades,
    })
}
