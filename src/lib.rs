//! Local-market intelligence engine for precious-metals traders.
//!
//! Everything operates on a caller-supplied in-memory [`domain::Snapshot`]
//! of reference data (settings, categories, unit definitions, markets,
//! locations, quotes). The engine entry points are pure read-only
//! queries; persistence, import/export, and presentation live in the
//! surrounding application.

pub mod domain;
pub mod util;

pub use domain::{
    evaluate_arbitrage, heatmap_grid, melt_per_unit, quote_price_per_unit, score_opportunity,
    ArbOutcome, ArbQuery, ArbRating, EvalError, HeatBand, HeatmapGrid, MarketScope, Metal,
    OpportunityScore, PriceError, RankedPair, Settings, Snapshot, StoreError,
};
