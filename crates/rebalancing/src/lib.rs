//! # Meridian Rebalancing Strategies
//!
//! This crate contains the beta-neutralization logic for the simulator. It
//! defines a universal `RebalanceStrategy` trait and provides two concrete
//! implementations behind the same contract.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   price sources or reporting. It depends only on `core-types` and `beta`.
//! - **Strategy Agnostic Engine:** The simulation loop operates on any
//!   strategy through the trait, so the heuristics can be swapped in
//!   configuration without touching the loop.
//! - **No-op is the common case:** when measured beta is inside the tolerance
//!   band, every strategy returns the portfolio unchanged with zero cost and
//!   an empty trade log.
//!
//! ## Public API
//!
//! - `RebalanceStrategy`: the core trait all strategies implement.
//! - `SingleStep`: default, one asymmetric 60/40 correction per trigger.
//! - `IterativeDamped`: damped iteration with a best-seen fallback.
//! - `create_strategy`: the factory that constructs a strategy from its id.

pub mod error;
pub mod iterative;
pub mod single_step;
mod sleeves;

pub use error::RebalanceError;
pub use iterative::IterativeDamped;
pub use single_step::SingleStep;

// Re-export the strategy id from core_types.
pub use core_types::RebalanceStrategyId;

use chrono::NaiveDate;
use core_types::{BetaMap, Portfolio, ShareRounding, TransactionLogEntry};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Tunable inputs shared by every rebalancing strategy.
#[derive(Debug, Clone)]
pub struct RebalanceParams {
    pub target_beta: Decimal,
    /// Maximum |measured - target| beta before a trade is triggered.
    pub tolerance: Decimal,
    /// Cost per share traded, charged on the unsigned magnitude of each leg.
    pub fee_per_share: Decimal,
    pub rounding: ShareRounding,
}

/// The result of one rebalancing decision.
#[derive(Debug, Clone)]
pub struct RebalanceOutcome {
    /// The full post-decision portfolio, including unchanged tickers.
    pub portfolio: Portfolio,
    /// Whether the tolerance gate triggered a trade attempt.
    pub rebalanced: bool,
    /// Portfolio beta measured before any trade.
    pub pre_trade_beta: Decimal,
    pub transaction_cost: Decimal,
    /// One entry per ticker whose share count actually changed.
    pub trades: Vec<TransactionLogEntry>,
}

impl RebalanceOutcome {
    fn no_op(portfolio: Portfolio, pre_trade_beta: Decimal) -> Self {
        Self {
            portfolio,
            rebalanced: false,
            pre_trade_beta,
            transaction_cost: Decimal::ZERO,
            trades: Vec::new(),
        }
    }
}

/// The core trait every rebalancing heuristic implements.
///
/// Implementations receive read-only views of the current state and return
/// new state; they never mutate caller-owned inputs. The `Send + Sync` bounds
/// allow independent simulation runs to execute in parallel.
pub trait RebalanceStrategy: Send + Sync {
    /// A short human-readable name for logs and reports.
    fn name(&self) -> &'static str;

    /// Measures the portfolio against the target beta and, if the tolerance
    /// gate trips, computes a new share allocation plus its transaction cost
    /// and trade log.
    fn rebalance(
        &self,
        portfolio: &Portfolio,
        prices: &BTreeMap<String, Decimal>,
        betas: &BetaMap,
        date: NaiveDate,
    ) -> Result<RebalanceOutcome, RebalanceError>;
}

/// Constructs the strategy selected in configuration.
pub fn create_strategy(
    id: RebalanceStrategyId,
    params: RebalanceParams,
) -> Box<dyn RebalanceStrategy> {
    match id {
        RebalanceStrategyId::SingleStep => Box::new(SingleStep::new(params)),
        RebalanceStrategyId::IterativeDamped => Box::new(IterativeDamped::new(params)),
    }
}
