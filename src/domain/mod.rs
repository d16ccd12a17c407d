//! Pricing and arbitrage-evaluation logic lives here.

pub mod arbitrage;
pub mod entities;
pub mod heatmap;
pub mod pricing;
pub mod snapshot;

pub use arbitrage::{
    evaluate_arbitrage, ArbOutcome, ArbQuery, ArbRating, EvalError, RankedPair, MAX_RESULTS,
};
pub use entities::{
    Category, CategoryId, Location, LocationId, Market, MarketId, Metal, Quote, QuoteId, Settings,
    UnitDefinition,
};
pub use heatmap::{heatmap_grid, score_opportunity, HeatBand, HeatmapGrid, HeatmapRow, OpportunityScore};
pub use pricing::{melt_per_unit, quote_price_per_unit, sell_proceeds_per_unit, PriceError};
pub use snapshot::{LocationInput, MarketScope, QuoteInput, Snapshot, StoreError};
