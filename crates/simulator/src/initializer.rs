use crate::error::SimulationError;
use beta::compute_portfolio_beta;
use chrono::NaiveDate;
use configuration::Config;
use core_types::{
    AllocationPolicy, BetaMap, CoreError, Portfolio, ShareRounding, TransactionLogEntry,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

/// The opening state of a run: the allocated book, what it cost to open, the
/// synthetic opening trades, and the book's just-measured beta.
#[derive(Debug, Clone)]
pub struct InitialAllocation {
    pub portfolio: Portfolio,
    pub transaction_cost: Decimal,
    pub trades: Vec<TransactionLogEntry>,
    pub initial_beta: Decimal,
}

/// Allocates starting capital into long and short share positions using the
/// configured policy.
pub fn initialize_portfolio(
    config: &Config,
    betas: &BetaMap,
    initial_prices: &BTreeMap<String, Decimal>,
    date: NaiveDate,
) -> Result<InitialAllocation, SimulationError> {
    let portfolio = match config.simulation.allocation_policy {
        AllocationPolicy::EqualSplit => equal_split(config, initial_prices, date)?,
        AllocationPolicy::TargetBeta => target_beta_solve(config, betas, initial_prices, date)?,
    };

    // The equal-split policy always charges per-share opening costs; for the
    // target-beta policy it is configurable.
    let charge_costs = match config.simulation.allocation_policy {
        AllocationPolicy::EqualSplit => true,
        AllocationPolicy::TargetBeta => config.fees.charge_initial_costs,
    };

    let values = portfolio.position_values(initial_prices, date)?;
    let initial_beta = compute_portfolio_beta(&values, betas)?;

    let fee = config.fees.transaction_fee_per_share;
    let mut trades = Vec::with_capacity(portfolio.len());
    let mut total_cost = Decimal::ZERO;
    for (ticker, shares) in portfolio.iter() {
        let magnitude = shares.abs();
        if magnitude.is_zero() {
            continue;
        }
        let price = lookup_price(initial_prices, ticker, date)?;
        let leg_cost = if charge_costs {
            magnitude * fee
        } else {
            Decimal::ZERO
        };
        total_cost += leg_cost;
        trades.push(TransactionLogEntry {
            date,
            ticker: ticker.clone(),
            shares_traded: magnitude,
            price,
            portfolio_beta: initial_beta,
            transaction_cost: leg_cost,
        });
    }

    Ok(InitialAllocation {
        portfolio,
        transaction_cost: total_cost,
        trades,
        initial_beta,
    })
}

/// 50/50 capital split between the sleeves, equal weight within each sleeve,
/// whole shares only.
fn equal_split(
    config: &Config,
    prices: &BTreeMap<String, Decimal>,
    date: NaiveDate,
) -> Result<Portfolio, SimulationError> {
    let sleeve_capital = config.portfolio.initial_capital / dec!(2);
    let mut portfolio = Portfolio::new();

    let long_allocation = sleeve_capital / Decimal::from(config.portfolio.tickers_long.len());
    for ticker in &config.portfolio.tickers_long {
        let price = lookup_price(prices, ticker, date)?;
        portfolio.insert(ticker, ShareRounding::Whole.apply(long_allocation / price));
    }

    let short_allocation = sleeve_capital / Decimal::from(config.portfolio.tickers_short.len());
    for ticker in &config.portfolio.tickers_short {
        let price = lookup_price(prices, ticker, date)?;
        portfolio.insert(ticker, -ShareRounding::Whole.apply(short_allocation / price));
    }

    Ok(portfolio)
}

/// Solves the two-sleeve neutrality equation for the configured gross
/// exposure and target beta:
///
///   L = total_exposure × avg_short_beta / (avg_long_beta + avg_short_beta)
///   S = total_exposure − L
///
/// then allocates L and S equally across their sleeves at initial prices.
/// With equal weights this puts the opening beta exactly on target.
fn target_beta_solve(
    config: &Config,
    betas: &BetaMap,
    prices: &BTreeMap<String, Decimal>,
    date: NaiveDate,
) -> Result<Portfolio, SimulationError> {
    let avg_long_beta = average_beta(&config.portfolio.tickers_long, betas)?;
    let avg_short_beta = average_beta(&config.portfolio.tickers_short, betas)?;

    let denominator = avg_long_beta + avg_short_beta;
    if denominator.is_zero() {
        return Err(SimulationError::DegenerateSleeveBetas);
    }

    let total_exposure = config.portfolio.initial_capital * config.portfolio.gross_exposure;
    let long_dollars = total_exposure * avg_short_beta / denominator;
    let short_dollars = total_exposure - long_dollars;

    let rounding = config.simulation.share_rounding;
    let mut portfolio = Portfolio::new();

    let long_allocation = long_dollars / Decimal::from(config.portfolio.tickers_long.len());
    for ticker in &config.portfolio.tickers_long {
        let price = lookup_price(prices, ticker, date)?;
        portfolio.insert(ticker, rounding.apply(long_allocation / price));
    }

    let short_allocation = short_dollars / Decimal::from(config.portfolio.tickers_short.len());
    for ticker in &config.portfolio.tickers_short {
        let price = lookup_price(prices, ticker, date)?;
        portfolio.insert(ticker, rounding.apply(-(short_allocation / price)));
    }

    Ok(portfolio)
}

fn average_beta(tickers: &[String], betas: &BetaMap) -> Result<Decimal, SimulationError> {
    let mut sum = Decimal::ZERO;
    for ticker in tickers {
        sum += betas
            .get(ticker)
            .ok_or_else(|| SimulationError::MissingBeta(ticker.clone()))?;
    }
    Ok(sum / Decimal::from(tickers.len()))
}

fn lookup_price(
    prices: &BTreeMap<String, Decimal>,
    ticker: &str,
    date: NaiveDate,
) -> Result<Decimal, SimulationError> {
    prices
        .get(ticker)
        .copied()
        .ok_or_else(|| {
            SimulationError::Valuation(CoreError::MissingPrice {
                ticker: ticker.to_string(),
                date,
            })
        })
}
