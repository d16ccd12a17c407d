//! Melt & pricing calculator.
//!
//! Melt value is ounces of pure metal times spot; a quote prices a unit
//! as a fraction of melt plus a signed flat premium.

use thiserror::Error;

use super::entities::{Metal, Quote};
use super::snapshot::Snapshot;

#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    #[error("no positive oz-per-unit definition for category {0:?}")]
    MissingMeltDefinition(String),
    #[error("spot price for {0} is not a positive finite number")]
    InvalidSpotPrice(Metal),
    #[error("quote has neither a buy nor a sell percentage")]
    NoPriceableQuote,
}

/// Melt value of one unit of a category: `oz_per_unit * spot`.
pub fn melt_per_unit(
    snapshot: &Snapshot,
    metal: Metal,
    category_name: &str,
) -> Result<f64, PriceError> {
    let oz = snapshot
        .oz_per_unit(category_name)
        .ok_or_else(|| PriceError::MissingMeltDefinition(category_name.to_string()))?;
    let spot = snapshot.settings.spot_for(metal);
    if !spot.is_finite() || spot <= 0.0 {
        return Err(PriceError::InvalidSpotPrice(metal));
    }
    Ok(oz * spot)
}

/// Per-unit price implied by a quote: `pct * melt + flat_premium`.
///
/// Prefers the buy percentage; falls back to the sell percentage so a
/// one-sided quote can still serve as a generic price estimate outside
/// the two-sided arbitrage flow.
pub fn quote_price_per_unit(snapshot: &Snapshot, quote: &Quote) -> Result<f64, PriceError> {
    let melt = melt_per_unit(snapshot, quote.metal, &quote.category)?;
    let pct = quote
        .buy_pct_melt
        .filter(|p| p.is_finite())
        .or_else(|| quote.sell_pct_melt.filter(|p| p.is_finite()))
        .ok_or(PriceError::NoPriceableQuote)?;
    Ok(pct * melt + quote.flat_premium)
}

/// Per-unit proceeds when the trader sells to this dealer:
/// `sell_pct * melt + flat_premium`. The flat premium keeps its sign:
/// dealers quote both "melt minus a dollar" and "melt plus a dollar".
pub fn sell_proceeds_per_unit(snapshot: &Snapshot, quote: &Quote) -> Result<f64, PriceError> {
    let melt = melt_per_unit(snapshot, quote.metal, &quote.category)?;
    let pct = quote
        .sell_pct_melt
        .filter(|p| p.is_finite())
        .ok_or(PriceError::NoPriceableQuote)?;
    Ok(pct * melt + quote.flat_premium)
}
