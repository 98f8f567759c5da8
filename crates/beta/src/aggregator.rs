use crate::error::BetaError;
use core_types::BetaMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Calculates the dollar-weighted average beta for a basket of signed
/// positions.
///
/// The weighting uses *signed* position values over the *unsigned* total
/// exposure: a short position in a high-beta name has negative value and so
/// contributes negatively, correctly capturing that shorting it reduces
/// portfolio beta.
///
/// Tickers absent from the beta map are excluded from the weighted sum. That
/// is a soft failure by contract; callers that care should detect and log it.
/// A zero total exposure is a hard domain error: it signals an all-zero book,
/// which is a configuration bug upstream and must not be silently zeroed.
pub fn compute_portfolio_beta(
    positions: &BTreeMap<String, Decimal>,
    betas: &BetaMap,
) -> Result<Decimal, BetaError> {
    let total_exposure: Decimal = positions.values().map(|v| v.abs()).sum();
    if total_exposure.is_zero() {
        return Err(BetaError::ZeroTotalExposure);
    }

    let weighted_sum: Decimal = positions
        .iter()
        .filter_map(|(ticker, value)| betas.get(ticker).map(|beta| value * beta))
        .sum();

    Ok(weighted_sum / total_exposure)
}
