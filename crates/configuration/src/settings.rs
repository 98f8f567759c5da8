use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{AllocationPolicy, RebalanceStrategyId, ReturnBasis, ShareRounding};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeSet;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portfolio: PortfolioParams,
    pub fees: FeeParams,
    pub simulation: SimulationParams,
}

/// Describes the book being simulated.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioParams {
    /// Starting capital in USD.
    pub initial_capital: Decimal,
    /// Desired gross exposure as a multiple of capital (e.g. 1.5).
    pub gross_exposure: Decimal,
    /// Target portfolio beta; 0 for a market-neutral book.
    pub target_beta: Decimal,
    /// Maximum allowed |measured beta - target beta| before rebalancing
    /// triggers (e.g. 0.05).
    pub beta_tolerance: Decimal,
    /// Tickers held long. Must be disjoint from the short sleeve.
    pub tickers_long: Vec<String>,
    /// Tickers held short.
    pub tickers_short: Vec<String>,
    /// Market index symbol used for beta estimation (e.g. "^GSPC").
    pub market_index: String,
}

/// Fee parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeParams {
    /// Annual management fee as a fraction in [0, 1), accrued daily over 252
    /// trading days.
    pub management_fee_annual: Decimal,
    /// Cost per share traded, in USD (e.g. 0.01).
    pub transaction_fee_per_share: Decimal,
    /// Whether the target-beta initializer charges per-share costs on the
    /// opening positions. The equal-split policy always charges them.
    #[serde(default = "default_charge_initial_costs")]
    pub charge_initial_costs: bool,
}

fn default_charge_initial_costs() -> bool {
    true
}

/// Parameters of the simulation run itself.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationParams {
    /// First date of the simulation window (inclusive).
    pub start_date: NaiveDate,
    /// Last date of the simulation window (inclusive).
    pub end_date: NaiveDate,
    /// Minimum trading-day count the price table must cover.
    #[serde(default = "default_min_trading_days")]
    pub min_trading_days: usize,
    /// Constant USD/CAD rate used when no rate series is supplied.
    pub exchange_rate: Decimal,
    #[serde(default)]
    pub allocation_policy: AllocationPolicy,
    #[serde(default)]
    pub rebalance_strategy: RebalanceStrategyId,
    #[serde(default)]
    pub return_basis: ReturnBasis,
    #[serde(default)]
    pub share_rounding: ShareRounding,
}

fn default_min_trading_days() -> usize {
    5
}

impl Config {
    /// Fail-fast validation of everything that would otherwise surface as a
    /// mid-run failure. A run never partially executes on a bad configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portfolio.tickers_long.is_empty() {
            return Err(ConfigError::ValidationError(
                "tickers_long must not be empty".to_string(),
            ));
        }
        if self.portfolio.tickers_short.is_empty() {
            return Err(ConfigError::ValidationError(
                "tickers_short must not be empty".to_string(),
            ));
        }

        let long: BTreeSet<_> = self.portfolio.tickers_long.iter().collect();
        let short: BTreeSet<_> = self.portfolio.tickers_short.iter().collect();
        let overlap: Vec<_> = long.intersection(&short).collect();
        if !overlap.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "tickers appear in both sleeves: {:?}",
                overlap
            )));
        }

        if self.portfolio.initial_capital <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "initial_capital must be positive".to_string(),
            ));
        }
        if self.portfolio.gross_exposure <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "gross_exposure must be positive".to_string(),
            ));
        }
        if self.portfolio.beta_tolerance <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "beta_tolerance must be positive".to_string(),
            ));
        }

        if self.fees.management_fee_annual < Decimal::ZERO
            || self.fees.management_fee_annual >= Decimal::ONE
        {
            return Err(ConfigError::ValidationError(
                "management_fee_annual must be a fraction in [0, 1)".to_string(),
            ));
        }
        if self.fees.transaction_fee_per_share < Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "transaction_fee_per_share must not be negative".to_string(),
            ));
        }

        if self.simulation.start_date > self.simulation.end_date {
            return Err(ConfigError::ValidationError(format!(
                "start_date {} is after end_date {}",
                self.simulation.start_date, self.simulation.end_date
            )));
        }

        // Whole shares are the equal-split policy's defining convention; a
        // fractional setting alongside it would silently mix conventions.
        if self.simulation.allocation_policy == AllocationPolicy::EqualSplit
            && self.simulation.share_rounding != ShareRounding::Whole
        {
            return Err(ConfigError::ValidationError(
                "allocation_policy = \"equal_split\" requires share_rounding = \"whole\""
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// All tickers the portfolio holds, long sleeve first.
    pub fn held_tickers(&self) -> Vec<String> {
        self.portfolio
            .tickers_long
            .iter()
            .chain(self.portfolio.tickers_short.iter())
            .cloned()
            .collect()
    }
}
