use crate::error::SimulationError;
use crate::initializer::initialize_portfolio;
use crate::observer::{NullObserver, SimulationObserver};
use beta::compute_portfolio_beta;
use configuration::Config;
use core_types::{
    gross_exposure, net_value, BetaMap, DailyResult, ExchangeRateSeries, PriceTable, ReturnBasis,
    TransactionLogEntry,
};
use rebalancing::{create_strategy, RebalanceParams, RebalanceStrategy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};
use uuid::Uuid;

const TRADING_DAYS_PER_YEAR: Decimal = dec!(252);

/// The complete output of one run: an ordered daily results table and the
/// flat transaction log spanning the whole period. Immutable once returned.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub run_id: Uuid,
    pub results: Vec<DailyResult>,
    pub transactions: Vec<TransactionLogEntry>,
}

/// The core orchestrator: initializes the book on the first trading day and
/// then advances one day at a time until the price table is exhausted.
///
/// The simulator owns the mutable portfolio for the duration of `run`; the
/// strategy and aggregator see read-only views and return new state.
pub struct Simulator {
    config: Config,
    strategy: Box<dyn RebalanceStrategy>,
    observer: Box<dyn SimulationObserver>,
}

impl Simulator {
    /// Builds a simulator with an explicit strategy and no observer.
    pub fn new(config: Config, strategy: Box<dyn RebalanceStrategy>) -> Self {
        Self {
            config,
            strategy,
            observer: Box::new(NullObserver),
        }
    }

    /// Builds a simulator with the strategy selected in configuration.
    pub fn from_config(config: Config) -> Self {
        let params = RebalanceParams {
            target_beta: config.portfolio.target_beta,
            tolerance: config.portfolio.beta_tolerance,
            fee_per_share: config.fees.transaction_fee_per_share,
            rounding: config.simulation.share_rounding,
        };
        let strategy = create_strategy(config.simulation.rebalance_strategy, params);
        Self::new(config, strategy)
    }

    /// Attaches a progress observer.
    pub fn with_observer(mut self, observer: Box<dyn SimulationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runs the full simulation over every date in the price table.
    ///
    /// Returns the complete results or a single typed error; a failure on any
    /// day unwinds the whole run and no partial series is ever produced.
    pub fn run(
        &self,
        prices: &PriceTable,
        betas: &BetaMap,
        exchange_rates: &ExchangeRateSeries,
    ) -> Result<SimulationRun, SimulationError> {
        self.config.validate()?;
        let first_date = prices.first_date().ok_or(SimulationError::EmptyPriceTable)?;

        // Missing betas are tolerated by the aggregator (excluded from the
        // weighted sum) but they are a data-quality problem worth surfacing.
        for ticker in self.config.held_tickers() {
            if !betas.contains(&ticker) {
                warn!(ticker = %ticker, "held ticker has no beta; it will not contribute to portfolio beta");
            }
        }

        let first_row = prices
            .row(first_date)
            .ok_or(SimulationError::MissingPriceRow(first_date))?;
        let allocation = initialize_portfolio(&self.config, betas, first_row, first_date)?;
        info!(
            strategy = self.strategy.name(),
            initial_beta = %allocation.initial_beta,
            "portfolio initialized"
        );

        let mut current_portfolio = allocation.portfolio;
        let mut transactions = allocation.trades;
        let mut initial_cost = Some(allocation.transaction_cost);

        let mut results: Vec<DailyResult> = Vec::with_capacity(prices.len());
        let mut previous_basis: Option<Decimal> = None;

        self.observer.simulation_started(prices.len());

        for (&date, row) in prices.rows() {
            // 1-3. Value the book and measure beta before any trade.
            let values = current_portfolio.position_values(row, date)?;
            let gross = gross_exposure(&values);
            let net = net_value(&values);
            let portfolio_beta = compute_portfolio_beta(&values, betas)?;

            // 4. The strategy applies the tolerance gate itself; the no-op
            // path returns the book unchanged at zero cost.
            let outcome = self.strategy.rebalance(&current_portfolio, row, betas, date)?;
            let mut transaction_costs = initial_cost.take().unwrap_or(Decimal::ZERO);
            if outcome.rebalanced {
                transaction_costs += outcome.transaction_cost;
                transactions.extend(outcome.trades);
                current_portfolio = outcome.portfolio;
            }

            // 5. Daily return on the configured basis; first day is 0.
            let basis = match self.config.simulation.return_basis {
                ReturnBasis::GrossExposure => gross,
                ReturnBasis::NetValue => net,
            };
            let daily_return = match previous_basis {
                Some(prior) => {
                    if prior.is_zero() {
                        return Err(SimulationError::DegenerateReturnBasis(date));
                    }
                    (basis - prior) / prior
                }
                None => Decimal::ZERO,
            };

            // 6. Management fee accrues daily on gross exposure; net value of
            // a neutral book is too close to zero to be a fee basis.
            let management_fee =
                self.config.fees.management_fee_annual / TRADING_DAYS_PER_YEAR * gross;

            // 7. Presentation-only currency conversion at the day's rate.
            let exchange_rate = exchange_rates
                .rate(date)
                .ok_or(SimulationError::MissingExchangeRate(date))?;
            let portfolio_value_cad = net * exchange_rate;

            // 8. Append the day's immutable record.
            let result = DailyResult {
                date,
                portfolio_value_usd: net,
                gross_exposure_usd: gross,
                portfolio_value_cad,
                portfolio_beta,
                daily_return,
                management_fee,
                transaction_costs,
                rebalanced: outcome.rebalanced,
                exchange_rate,
            };
            self.observer.day_completed(&result);
            results.push(result);
            previous_basis = Some(basis);

            // 9. Costs compound out of the book: every share count is scaled
            // so "shares held" stays consistent with cash actually available.
            let total_costs = management_fee + transaction_costs;
            if total_costs > Decimal::ZERO {
                let scale = Decimal::ONE - total_costs / gross;
                let rounding = self.config.simulation.share_rounding;
                for (_, shares) in current_portfolio.iter_mut() {
                    *shares = rounding.apply(*shares * scale);
                }
            }
        }

        self.observer.simulation_completed();
        info!(days = results.len(), trades = transactions.len(), "simulation completed");

        Ok(SimulationRun {
            run_id: Uuid::new_v4(),
            results,
            transactions,
        })
    }
}
