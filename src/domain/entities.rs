use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Ids are opaque strings minted by [`crate::util::generate_id`].
pub type MarketId = String;
pub type LocationId = String;
pub type CategoryId = String;
pub type QuoteId = String;

/// The two metals the engine prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Silver,
    Gold,
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metal::Silver => write!(f, "silver"),
            Metal::Gold => write!(f, "gold"),
        }
    }
}

/// Trader-level configuration: spot inputs, trip-cost inputs, and the
/// profit-per-hour thresholds behind the arbitrage rating bands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Currency units per troy ounce.
    pub spot_silver: f64,
    pub spot_gold: f64,
    pub gas_cost_per_mile: f64,
    /// What one hour of the trader's time is worth.
    pub hourly_value: f64,
    pub default_qty: f64,
    pub strong_profit_per_hour: f64,
    pub medium_profit_per_hour: f64,
}

impl Settings {
    /// Configured spot price for a metal. May be non-finite or <= 0 if
    /// the trader entered garbage; pricing treats that as unavailable.
    pub fn spot_for(&self, metal: Metal) -> f64 {
        match metal {
            Metal::Silver => self.spot_silver,
            Metal::Gold => self.spot_gold,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spot_silver: 85.00,
            spot_gold: 5000.00,
            gas_cost_per_mile: 0.30,
            hourly_value: 80.0,
            default_qty: 10.0,
            strong_profit_per_hour: 250.0,
            medium_profit_per_hour: 120.0,
        }
    }
}

/// A tradeable item type (e.g. "ASE (1 oz)", "90% junk ($1 face)").
///
/// Quotes and unit definitions join on the (name, metal) pair, not the
/// id: a deliberate denormalization carried over from the source data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub metal: Metal,
    pub name: String,
}

/// Troy ounces of pure metal represented by one unit of a category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub category_name: String,
    pub oz_per_unit: f64,
}

/// A geographic trading region used to scope locations and to supply a
/// default one-way drive-time estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub name: String,
    pub radius_miles: f64,
    pub drive_time_hours: f64,
    pub active: bool,
}

/// A physical dealer, owned by exactly one market.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub market_id: MarketId,
    pub name: String,
    /// Free-form tag: LCS, pawn, show, ...
    pub kind: String,
    pub city: String,
    /// One-way distance from the trader's base.
    pub distance_mi: f64,
    /// 1 (avoid) .. 5 (trusted).
    pub trust_score: u8,
    pub notes: String,
}

/// A priced offer at one (location, metal, category) triple.
///
/// Percentages are fractions of melt in [0, 1]; the write boundary in
/// [`crate::domain::snapshot`] enforces the range. Either may be absent,
/// and both being present is normal: they price different legs of a
/// trade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub location_id: LocationId,
    pub metal: Metal,
    pub category: String,
    /// Fraction of melt the dealer charges when the trader buys from them.
    pub buy_pct_melt: Option<f64>,
    /// Fraction of melt the dealer pays when the trader sells to them.
    pub sell_pct_melt: Option<f64>,
    /// Signed flat add-on applied after the percentage calculation.
    pub flat_premium: f64,
    pub notes: String,
    pub last_updated: SystemTime,
}
