use crate::error::RebalanceError;
use crate::sleeves::{correction_step, settle};
use crate::{RebalanceOutcome, RebalanceParams, RebalanceStrategy};
use beta::compute_portfolio_beta;
use chrono::NaiveDate;
use core_types::{BetaMap, Portfolio};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// The default rebalancing heuristic: one asymmetric 60/40 correction per
/// trigger.
///
/// This is a single-step approximation, not a closed-form solve. Its
/// convergence in one call is not mathematically guaranteed, but for books
/// whose beta drifts gradually it lands inside the tolerance band and the
/// next call takes the no-op path.
pub struct SingleStep {
    params: RebalanceParams,
}

impl SingleStep {
    pub fn new(params: RebalanceParams) -> Self {
        Self { params }
    }
}

impl RebalanceStrategy for SingleStep {
    fn name(&self) -> &'static str {
        "single_step"
    }

    fn rebalance(
        &self,
        portfolio: &Portfolio,
        prices: &BTreeMap<String, Decimal>,
        betas: &BetaMap,
        date: NaiveDate,
    ) -> Result<RebalanceOutcome, RebalanceError> {
        let values = portfolio.position_values(prices, date)?;
        let current_beta = compute_portfolio_beta(&values, betas)?;

        if (current_beta - self.params.target_beta).abs() <= self.params.tolerance {
            return Ok(RebalanceOutcome::no_op(portfolio.clone(), current_beta));
        }

        let (adjusted, _) = correction_step(
            portfolio,
            prices,
            betas,
            date,
            self.params.target_beta,
            Decimal::ONE,
        )?;
        settle(portfolio, &adjusted, prices, current_beta, date, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ShareRounding;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
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

    fn prices() -> BTreeMap<String, Decimal> {
        [
            ("A".to_string(), dec!(180)),
            ("B".to_string(), dec!(390)),
            ("C".to_string(), dec!(220)),
            ("D".to_string(), dec!(370)),
        ]
        .into_iter()
        .collect()
    }

    fn book(a: i64, b: i64, c: i64, d: i64) -> Portfolio {
        [
            ("A".to_string(), Decimal::from(a)),
            ("B".to_string(), Decimal::from(b)),
            ("C".to_string(), Decimal::from(c)),
            ("D".to_string(), Decimal::from(d)),
        ]
        .into_iter()
        .collect()
    }

    fn params() -> RebalanceParams {
        RebalanceParams {
            target_beta: Decimal::ZERO,
            tolerance: dec!(0.05),
            fee_per_share: dec!(0.01),
            rounding: ShareRounding::Whole,
        }
    }

    fn measured_beta(portfolio: &Portfolio) -> Decimal {
        let values = portfolio.position_values(&prices(), d("2025-01-02")).unwrap();
        compute_portfolio_beta(&values, &betas()).unwrap()
    }

    #[test]
    fn within_tolerance_is_a_cheap_no_op() {
        // This book measures at beta -0.037, inside the 0.05 band.
        let portfolio = book(1000, 500, -800, -400);
        let strategy = SingleStep::new(params());

        let outcome = strategy
            .rebalance(&portfolio, &prices(), &betas(), d("2025-01-02"))
            .unwrap();

        assert!(!outcome.rebalanced);
        assert_eq!(outcome.portfolio, portfolio);
        assert_eq!(outcome.transaction_cost, Decimal::ZERO);
        assert!(outcome.trades.is_empty());
        assert!(outcome.pre_trade_beta.abs() <= dec!(0.05));
    }

    #[test]
    fn one_correction_lands_inside_the_band() {
        // Long sleeve overweight: beta drifts to roughly +0.10.
        let portfolio = book(1500, 500, -800, -400);
        assert!(measured_beta(&portfolio).abs() > dec!(0.05));

        let strategy = SingleStep::new(params());
        let outcome = strategy
            .rebalance(&portfolio, &prices(), &betas(), d("2025-01-02"))
            .unwrap();

        assert!(outcome.rebalanced);
        assert!(measured_beta(&outcome.portfolio).abs() <= dec!(0.05));

        // Applying the strategy to its own output takes the no-op path.
        let second = strategy
            .rebalance(&outcome.portfolio, &prices(), &betas(), d("2025-01-03"))
            .unwrap();
        assert!(!second.rebalanced);
        assert_eq!(second.portfolio, outcome.portfolio);
    }

    #[test]
    fn short_heavy_drift_also_converges() {
        let portfolio = book(1000, 500, -1400, -700);
        let strategy = SingleStep::new(params());

        let outcome = strategy
            .rebalance(&portfolio, &prices(), &betas(), d("2025-01-02"))
            .unwrap();

        assert!(outcome.rebalanced);
        assert!(measured_beta(&outcome.portfolio).abs() <= dec!(0.05));
    }

    #[test]
    fn trade_log_matches_applied_share_deltas() {
        let portfolio = book(1500, 500, -800, -400);
        let strategy = SingleStep::new(params());

        let outcome = strategy
            .rebalance(&portfolio, &prices(), &betas(), d("2025-01-02"))
            .unwrap();

        let applied: Decimal = outcome
            .portfolio
            .iter()
            .map(|(ticker, shares)| (shares - portfolio.shares(ticker)).abs())
            .sum();
        let logged: Decimal = outcome.trades.iter().map(|t| t.shares_traded).sum();
        assert_eq!(logged, applied);
        assert!(logged > Decimal::ZERO);

        // Every leg is costed at the per-share fee and stamped with the
        // pre-trade beta.
        for trade in &outcome.trades {
            assert_eq!(trade.transaction_cost, trade.shares_traded * dec!(0.01));
            assert_eq!(trade.portfolio_beta, outcome.pre_trade_beta);
            assert!(trade.shares_traded > Decimal::ZERO);
        }
        let total: Decimal = outcome.trades.iter().map(|t| t.transaction_cost).sum();
        assert_eq!(total, outcome.transaction_cost);
    }

    #[test]
    fn a_zero_contribution_sleeve_is_skipped_and_the_other_still_corrects() {
        // Long contributions cancel exactly (+1 and -1 at equal dollar
        // values), so the whole long sleeve can absorb no correction; the
        // short sleeve alone must move the book toward target.
        let betas: BetaMap = [
            ("A".to_string(), dec!(1)),
            ("B".to_string(), dec!(-1)),
            ("C".to_string(), dec!(1.5)),
        ]
        .into_iter()
        .collect();
        let prices: BTreeMap<String, Decimal> = [
            ("A".to_string(), dec!(100)),
            ("B".to_string(), dec!(100)),
            ("C".to_string(), dec!(100)),
        ]
        .into_iter()
        .collect();
        let portfolio: Portfolio = [
            ("A".to_string(), dec!(1000)),
            ("B".to_string(), dec!(1000)),
            ("C".to_string(), dec!(-1000)),
        ]
        .into_iter()
        .collect();

        let strategy = SingleStep::new(params());
        let outcome = strategy
            .rebalance(&portfolio, &prices, &betas, d("2025-01-02"))
            .unwrap();

        assert!(outcome.rebalanced);
        assert_eq!(outcome.pre_trade_beta, dec!(-0.5));
        // The long sleeve is returned untouched.
        assert_eq!(outcome.portfolio.shares("A"), dec!(1000));
        assert_eq!(outcome.portfolio.shares("B"), dec!(1000));
        assert!(outcome.trades.iter().all(|t| t.ticker == "C"));
        // The short sleeve takes its 60% slice: C scales by 0.4, and the
        // post-trade beta lands at -0.25.
        assert_eq!(outcome.portfolio.shares("C"), dec!(-400));
        let values = outcome
            .portfolio
            .position_values(&prices, d("2025-01-02"))
            .unwrap();
        assert_eq!(compute_portfolio_beta(&values, &betas).unwrap(), dec!(-0.25));
    }

    #[test]
    fn zero_beta_tickers_are_never_touched() {
        let mut all_betas = betas();
        all_betas.insert("Z", Decimal::ZERO);
        let mut portfolio = book(1500, 500, -800, -400);
        portfolio.insert("Z", dec!(100));
        let mut all_prices = prices();
        all_prices.insert("Z".to_string(), dec!(50));

        let strategy = SingleStep::new(params());
        let outcome = strategy
            .rebalance(&portfolio, &all_prices, &all_betas, d("2025-01-02"))
            .unwrap();

        assert!(outcome.rebalanced);
        assert_eq!(outcome.portfolio.shares("Z"), dec!(100));
        assert!(outcome.trades.iter().all(|t| t.ticker != "Z"));
    }
}
