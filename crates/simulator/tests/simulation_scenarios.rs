//! End-to-end simulation scenarios over a hand-built divergent market: long
//! tickers trend up 2% a day while short tickers trend down 2% a day, so the
//! book drifts long-heavy and the beta gate must trip repeatedly.

use chrono::NaiveDate;
use configuration::{Config, FeeParams, PortfolioParams, SimulationParams};
use core_types::{
    AllocationPolicy, BetaMap, ExchangeRateSeries, PriceTable, RebalanceStrategyId, ReturnBasis,
    ShareRounding,
};
use market_data::{business_days, constant_rates};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use simulator::Simulator;
use std::collections::BTreeSet;

const LONGS: [&str; 2] = ["A", "B"];
const SHORTS: [&str; 2] = ["C", "D"];
const DAYS: usize = 10;

fn start_date() -> NaiveDate {
    "2025-01-06".parse().unwrap()
}

fn divergent_prices() -> PriceTable {
    let dates = business_days(start_date(), DAYS);
    let mut table = PriceTable::new();
    let mut long_prices = [dec!(180), dec!(390)];
    let mut short_prices = [dec!(220), dec!(370)];
    for date in dates {
        for (ticker, price) in LONGS.iter().zip(long_prices.iter_mut()) {
            table.insert(date, ticker, *price);
            *price *= dec!(1.02);
        }
        for (ticker, price) in SHORTS.iter().zip(short_prices.iter_mut()) {
            table.insert(date, ticker, *price);
            *price *= dec!(0.98);
        }
    }
    table
}

fn betas() -> BetaMap {
    [
        ("A".to_string(), dec!(1.2)),
        ("B".to_string(), dec!(1.1)),
        ("C".to_string(), dec!(1.5)),
        ("D".to_string(), dec!(1.3)),
    ]
    .into_iter()
    .collect()
}

fn rates() -> ExchangeRateSeries {
    constant_rates(business_days(start_date(), DAYS), dec!(1.35))
}

fn config() -> Config {
    Config {
        portfolio: PortfolioParams {
            initial_capital: dec!(10000000),
            gross_exposure: dec!(1.5),
            target_beta: Decimal::ZERO,
            beta_tolerance: dec!(0.05),
            tickers_long: LONGS.iter().map(|t| t.to_string()).collect(),
            tickers_short: SHORTS.iter().map(|t| t.to_string()).collect(),
            market_index: "^GSPC".into(),
        },
        fees: FeeParams {
            management_fee_annual: dec!(0.02),
            transaction_fee_per_share: dec!(0.01),
            charge_initial_costs: true,
        },
        simulation: SimulationParams {
            start_date: start_date(),
            end_date: "2025-01-17".parse().unwrap(),
            min_trading_days: 5,
            exchange_rate: dec!(1.35),
            allocation_policy: AllocationPolicy::TargetBeta,
            rebalance_strategy: RebalanceStrategyId::SingleStep,
            return_basis: ReturnBasis::GrossExposure,
            share_rounding: ShareRounding::Fractional,
        },
    }
}

#[test]
fn a_full_run_produces_one_consistent_record_per_trading_day() {
    let run = Simulator::from_config(config())
        .run(&divergent_prices(), &betas(), &rates())
        .unwrap();

    assert_eq!(run.results.len(), DAYS);
    for window in run.results.windows(2) {
        assert!(window[0].date < window[1].date);
    }

    for day in &run.results {
        assert!(day.portfolio_value_usd > Decimal::ZERO);
        assert!(day.gross_exposure_usd > Decimal::ZERO);
        assert!(day.management_fee > Decimal::ZERO);
        assert!(day.transaction_costs >= Decimal::ZERO);
        assert_eq!(day.exchange_rate, dec!(1.35));
        // CAD valuation is exactly the stored net value at the stored rate.
        assert_eq!(
            day.portfolio_value_cad,
            day.portfolio_value_usd * day.exchange_rate
        );
    }
}

#[test]
fn daily_returns_follow_the_gross_exposure_recurrence() {
    let run = Simulator::from_config(config())
        .run(&divergent_prices(), &betas(), &rates())
        .unwrap();

    assert_eq!(run.results[0].daily_return, Decimal::ZERO);
    for window in run.results.windows(2) {
        let prior = window[0].gross_exposure_usd;
        let expected = (window[1].gross_exposure_usd - prior) / prior;
        assert_eq!(window[1].daily_return, expected);
    }
}

#[test]
fn the_beta_gate_trips_when_drift_leaves_the_band_and_only_then() {
    let run = Simulator::from_config(config())
        .run(&divergent_prices(), &betas(), &rates())
        .unwrap();

    let tolerance = dec!(0.05);
    let mut rebalance_days = 0;
    for day in &run.results {
        if day.rebalanced {
            rebalance_days += 1;
            assert!(day.portfolio_beta.abs() > tolerance, "{}", day.date);
        } else {
            assert!(day.portfolio_beta.abs() <= tolerance, "{}", day.date);
        }
    }
    // The opening book is on target, so day one never trades; the divergent
    // drift guarantees the gate trips at least once afterwards.
    assert!(!run.results[0].rebalanced);
    assert!(rebalance_days >= 1);

    // Rebalance-day costs are charged; quiet days after the first cost zero.
    for day in run.results.iter().skip(1) {
        if day.rebalanced {
            assert!(day.transaction_costs > Decimal::ZERO);
        } else {
            assert_eq!(day.transaction_costs, Decimal::ZERO);
        }
    }
}

#[test]
fn the_transaction_log_covers_the_opening_and_every_rebalance() {
    let config = config();
    let run = Simulator::from_config(config.clone())
        .run(&divergent_prices(), &betas(), &rates())
        .unwrap();

    let rebalance_days = run.results.iter().filter(|d| d.rebalanced).count();
    // Four opening legs, then both sleeves adjust on every rebalance day.
    assert_eq!(run.transactions.len(), 4 + 4 * rebalance_days);

    let held: BTreeSet<String> = config.held_tickers().into_iter().collect();
    let first = run.results.first().unwrap().date;
    let last = run.results.last().unwrap().date;
    for trade in &run.transactions {
        assert!(held.contains(&trade.ticker));
        assert!(trade.date >= first && trade.date <= last);
        assert!(trade.shares_traded > Decimal::ZERO);
        assert!(trade.price > Decimal::ZERO);
        assert_eq!(trade.transaction_cost, trade.shares_traded * dec!(0.01));
    }

    // The opening legs carry the day-one cost, reported on day one.
    let opening_cost: Decimal = run
        .transactions
        .iter()
        .filter(|t| t.date == first)
        .map(|t| t.transaction_cost)
        .sum();
    assert_eq!(run.results[0].transaction_costs, opening_cost);
}

#[test]
fn the_iterative_strategy_holds_the_same_tolerance_contract() {
    let mut config = config();
    config.simulation.rebalance_strategy = RebalanceStrategyId::IterativeDamped;
    let run = Simulator::from_config(config)
        .run(&divergent_prices(), &betas(), &rates())
        .unwrap();

    assert_eq!(run.results.len(), DAYS);
    let tolerance = dec!(0.05);
    for day in &run.results {
        if !day.rebalanced {
            assert!(day.portfolio_beta.abs() <= tolerance, "{}", day.date);
        }
    }
    assert!(run.results.iter().any(|d| d.rebalanced));
}

#[test]
fn whole_share_rounding_keeps_every_position_integral() {
    let mut config = config();
    config.simulation.share_rounding = ShareRounding::Whole;
    let run = Simulator::from_config(config)
        .run(&divergent_prices(), &betas(), &rates())
        .unwrap();

    // Whole-share trades have whole magnitudes in the log.
    for trade in run.transactions.iter().filter(|t| t.date != start_date()) {
        assert_eq!(trade.shares_traded.fract(), Decimal::ZERO, "{}", trade.ticker);
    }
    assert_eq!(run.results.len(), DAYS);
}
