//! All-pairs buy/sell arbitrage evaluation.
//!
//! For a chosen metal, category, quantity, and market scope, every quote
//! with a buy percentage becomes a sourcing candidate and every quote
//! with a sell percentage becomes an offload candidate. The full cross
//! product is costed with a one-loop trip model and ranked by net profit.

use std::cmp::Ordering;

use thiserror::Error;
use tracing::debug;

use super::entities::{Metal, Settings};
use super::pricing::{melt_per_unit, quote_price_per_unit, sell_proceeds_per_unit, PriceError};
use super::snapshot::{MarketScope, Snapshot};

/// How many ranked pairs an outcome surfaces to the caller.
pub const MAX_RESULTS: usize = 12;

/// Drive-time assumed when a location's market cannot be resolved.
const FALLBACK_TRIP_HOURS: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error("quantity must be a positive number, got {0}")]
    NonPositiveQuantity(f64),
    #[error("no quote in scope carries a buy percentage for this category")]
    NoBuyCandidates,
    #[error("no quote in scope carries a sell percentage for this category")]
    NoSellCandidates,
}

/// Inputs to [`evaluate_arbitrage`].
#[derive(Clone, Debug, PartialEq)]
pub struct ArbQuery {
    pub metal: Metal,
    pub category: String,
    pub quantity: f64,
    pub scope: MarketScope,
}

impl ArbQuery {
    /// Query using the snapshot's configured default transaction quantity.
    pub fn with_default_qty(
        snapshot: &Snapshot,
        metal: Metal,
        category: impl Into<String>,
        scope: MarketScope,
    ) -> Self {
        Self {
            metal,
            category: category.into(),
            quantity: snapshot.settings.default_qty,
            scope,
        }
    }
}

/// One costed buy/sell pair. Both endpoints are fully resolved; the
/// evaluator never emits a pair whose location id dangles.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedPair {
    pub buy_location_id: String,
    pub buy_location_name: String,
    pub buy_distance_mi: f64,
    pub buy_trust_score: u8,

    pub sell_location_id: String,
    pub sell_location_name: String,
    pub sell_distance_mi: f64,
    pub sell_trust_score: u8,

    pub unit_melt: f64,
    pub buy_price_per_unit: f64,
    pub sell_proceeds_per_unit: f64,
    pub quantity: f64,

    pub gross_profit: f64,
    pub trip_miles: f64,
    pub gas_cost: f64,
    pub trip_hours: f64,
    pub time_cost: f64,
    pub net_profit: f64,
    /// `None` when the trip hours are zero.
    pub profit_per_hour: Option<f64>,
}

impl RankedPair {
    pub fn rating(&self, settings: &Settings) -> ArbRating {
        ArbRating::for_profit_per_hour(self.profit_per_hour, settings)
    }

    /// Buying and selling at the same dealer. Kept in results by design;
    /// a genuine same-shop margin is worth seeing even if it ranks last.
    pub fn is_same_location(&self) -> bool {
        self.buy_location_id == self.sell_location_id
    }
}

/// Rating band for a pair's profit-per-hour, ordered worst to best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArbRating {
    NoScore,
    Noise,
    Medium,
    Strong,
}

impl ArbRating {
    /// Thresholds come from [`Settings`], unlike the heatmap bands which
    /// are fixed constants.
    pub fn for_profit_per_hour(profit_per_hour: Option<f64>, settings: &Settings) -> Self {
        let Some(pph) = profit_per_hour.filter(|v| v.is_finite()) else {
            return ArbRating::NoScore;
        };
        if pph >= settings.strong_profit_per_hour {
            ArbRating::Strong
        } else if pph >= settings.medium_profit_per_hour {
            ArbRating::Medium
        } else {
            ArbRating::Noise
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArbRating::NoScore => "No score",
            ArbRating::Noise => "Noise",
            ArbRating::Medium => "Medium",
            ArbRating::Strong => "Strong",
        }
    }
}

/// Ranked evaluation result: the top [`MAX_RESULTS`] pairs plus the
/// counts a caller (or test) needs to reason about the full search.
#[derive(Clone, Debug, PartialEq)]
pub struct ArbOutcome {
    pub results: Vec<RankedPair>,
    /// Pair count before truncation.
    pub total_pairs: usize,
    /// Quotes dropped because their location id resolved to nothing.
    pub skipped_dangling: usize,
}

/// Enumerate and rank every (buy location, sell location) pair for the
/// query, including same-location pairs.
pub fn evaluate_arbitrage(snapshot: &Snapshot, query: &ArbQuery) -> Result<ArbOutcome, EvalError> {
    if !query.quantity.is_finite() || query.quantity <= 0.0 {
        return Err(EvalError::NonPositiveQuantity(query.quantity));
    }

    // A category that cannot be melted aborts the whole evaluation.
    let unit_melt = melt_per_unit(snapshot, query.metal, &query.category)?;

    let locations = snapshot.locations_in_scope(&query.scope);

    // Restrict quotes to the scope, resolving each quote's location once.
    // A quote whose location id matches nothing is dropped and counted;
    // an out-of-scope quote is simply not part of this evaluation.
    let mut skipped_dangling = 0usize;
    let mut quotes = Vec::new();
    for quote in snapshot.quotes_for(query.metal, &query.category) {
        match snapshot.location(&quote.location_id) {
            None => {
                skipped_dangling += 1;
                debug!(quote_id = %quote.id, "skipping quote with dangling location id");
            }
            Some(loc) if locations.iter().any(|l| l.id == loc.id) => quotes.push((quote, loc)),
            Some(_) => {}
        }
    }

    let buy_candidates: Vec<_> = quotes
        .iter()
        .filter(|(q, _)| q.buy_pct_melt.filter(|p| p.is_finite()).is_some())
        .filter_map(|(q, loc)| {
            quote_price_per_unit(snapshot, q)
                .ok()
                .map(|price| (*q, *loc, price))
        })
        .filter(|(_, _, price)| price.is_finite())
        .collect();

    let sell_candidates: Vec<_> = quotes
        .iter()
        .filter(|(q, _)| q.sell_pct_melt.filter(|p| p.is_finite()).is_some())
        .filter_map(|(q, loc)| {
            sell_proceeds_per_unit(snapshot, q)
                .ok()
                .map(|proceeds| (*q, *loc, proceeds))
        })
        .filter(|(_, _, proceeds)| proceeds.is_finite())
        .collect();

    debug!(
        metal = %query.metal,
        category = %query.category,
        quotes = quotes.len(),
        buy_candidates = buy_candidates.len(),
        sell_candidates = sell_candidates.len(),
        "built arbitrage candidate sets"
    );

    if buy_candidates.is_empty() {
        return Err(EvalError::NoBuyCandidates);
    }
    if sell_candidates.is_empty() {
        return Err(EvalError::NoSellCandidates);
    }

    let settings = &snapshot.settings;
    let mut results = Vec::with_capacity(buy_candidates.len() * sell_candidates.len());

    for (_, buy_loc, buy_price) in &buy_candidates {
        // Time model: the buy-side market's typical drive time covers the
        // whole loop, even when the sell location sits in another market.
        let trip_hours = snapshot
            .market(&buy_loc.market_id)
            .map(|m| m.drive_time_hours)
            .unwrap_or(FALLBACK_TRIP_HOURS);

        for (_, sell_loc, proceeds) in &sell_candidates {
            let gross_profit = (proceeds - buy_price) * query.quantity;

            // One round trip sized by the farther errand, not the sum:
            // both stops are assumed combinable into a single loop.
            let trip_miles = 2.0 * buy_loc.distance_mi.max(sell_loc.distance_mi);
            let gas_cost = trip_miles * settings.gas_cost_per_mile;
            let time_cost = trip_hours * settings.hourly_value;
            let net_profit = gross_profit - gas_cost - time_cost;
            let profit_per_hour = (trip_hours > 0.0).then(|| net_profit / trip_hours);

            results.push(RankedPair {
                buy_location_id: buy_loc.id.clone(),
                buy_location_name: buy_loc.name.clone(),
                buy_distance_mi: buy_loc.distance_mi,
                buy_trust_score: buy_loc.trust_score,
                sell_location_id: sell_loc.id.clone(),
                sell_location_name: sell_loc.name.clone(),
                sell_distance_mi: sell_loc.distance_mi,
                sell_trust_score: sell_loc.trust_score,
                unit_melt,
                buy_price_per_unit: *buy_price,
                sell_proceeds_per_unit: *proceeds,
                quantity: query.quantity,
                gross_profit,
                trip_miles,
                gas_cost,
                trip_hours,
                time_cost,
                net_profit,
                profit_per_hour,
            });
        }
    }

    // Stable sort: ties keep candidate insertion order.
    results.sort_by(|a, b| {
        b.net_profit
            .partial_cmp(&a.net_profit)
            .unwrap_or(Ordering::Equal)
    });

    let total_pairs = results.len();
    results.truncate(MAX_RESULTS);

    debug!(total_pairs, skipped_dangling, "ranked arbitrage pairs");

    Ok(ArbOutcome {
        results,
        total_pairs,
        skipped_dangling,
    })
}
