use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The convention for holding share counts between trades.
///
/// This is a single run-wide flag: the initializer, the rebalancer, and the
/// daily cost-deduction step all apply the same convention. Mixing whole and
/// fractional shares mid-run breaks share-count invariants downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareRounding {
    /// Every share count is rounded to the nearest whole share.
    Whole,
    /// Share counts may drift to fractional values after costs are deducted.
    #[default]
    Fractional,
}

impl ShareRounding {
    /// Applies the convention to a signed share count.
    ///
    /// Whole-share rounding rounds the magnitude and re-applies the sign, so
    /// -10.5 becomes -11 rather than -10.
    pub fn apply(&self, shares: Decimal) -> Decimal {
        match self {
            ShareRounding::Whole => {
                let rounded = shares
                    .abs()
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                if shares.is_sign_negative() {
                    -rounded
                } else {
                    rounded
                }
            }
            ShareRounding::Fractional => shares,
        }
    }
}

/// Which value series daily returns (and the return-linked metrics) key off.
///
/// Both bases are defensible for a market-neutral book, but they are not
/// interchangeable; one is chosen per run and never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnBasis {
    /// Sum of absolute position values. Stable even when net value is ~0,
    /// which is why it is the default for a market-neutral book.
    #[default]
    GrossExposure,
    /// Signed sum of position values. Requires a nonzero net book.
    NetValue,
}

/// How starting capital is turned into opening positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// 50/50 long/short capital split, equal weight within each sleeve,
    /// whole shares, per-share costs charged on every opening share.
    EqualSplit,
    /// Solve the two-sleeve neutrality equation for the configured gross
    /// exposure and target beta. Fractional shares by default.
    #[default]
    TargetBeta,
}

/// Identifies which rebalancing strategy to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceStrategyId {
    /// One asymmetric 60/40 correction per trigger. Deterministic and fast.
    #[default]
    SingleStep,
    /// Damped iteration up to a fixed cap, falling back to the best beta
    /// distance seen. Trades speed for robustness.
    IterativeDamped,
}
