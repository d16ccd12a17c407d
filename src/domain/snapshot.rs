//! In-memory reference snapshot: entity lookups, market scoping, and the
//! guarded write surface whose invariants the evaluator relies on.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{
    Category, CategoryId, Location, LocationId, Market, MarketId, Metal, Quote, QuoteId, Settings,
    UnitDefinition,
};
use crate::util::generate_id;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{field} must be between 0 and 1, got {value}")]
    OutOfRangePercentage { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NonFiniteNumber { field: &'static str },
    #[error("{field} must be greater than zero")]
    NonPositiveValue { field: &'static str },
    #[error("distance must be a finite number of miles >= 0, got {0}")]
    InvalidDistance(f64),
    #[error("trust score must be between 1 and 5, got {0}")]
    InvalidTrustScore(u8),
    #[error("no market with id {0}")]
    UnknownMarket(MarketId),
    #[error("no location with id {0}")]
    UnknownLocation(LocationId),
    #[error("no {metal} category named {name:?}")]
    UnknownCategory { metal: Metal, name: String },
    #[error("no category with id {0}")]
    UnknownCategoryId(CategoryId),
    #[error("a {metal} category named {name:?} already exists")]
    DuplicateCategory { metal: Metal, name: String },
    #[error("market still has locations; delete or move them first")]
    MarketHasLocations,
    #[error("location still has quotes; delete them first")]
    LocationHasQuotes,
    #[error("category is still referenced by quotes; delete them first")]
    CategoryInUse,
}

/// Which locations an evaluation or heatmap should consider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MarketScope {
    /// Every location regardless of market.
    AllLocations,
    /// Locations whose owning market is flagged active.
    #[default]
    ActiveMarkets,
    /// Locations owned by one specific market.
    Market(MarketId),
}

/// Fields accepted by [`Snapshot::upsert_quote`]. The id and timestamp
/// are assigned by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteInput {
    pub location_id: LocationId,
    pub metal: Metal,
    pub category: String,
    pub buy_pct_melt: Option<f64>,
    pub sell_pct_melt: Option<f64>,
    pub flat_premium: f64,
    pub notes: String,
}

/// The whole reference dataset the engine reads: settings, categories,
/// unit definitions, markets, locations, quotes.
///
/// Engine entry points take `&Snapshot` and never mutate it; all writes
/// go through the guarded methods here so referential integrity and the
/// one-quote-per-triple invariant hold by construction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub settings: Settings,
    pub categories: Vec<Category>,
    pub unit_defs: Vec<UnitDefinition>,
    pub markets: Vec<Market>,
    pub locations: Vec<Location>,
    pub quotes: Vec<Quote>,
}

impl Snapshot {
    /// A snapshot pre-seeded with the common US bullion categories, their
    /// practical oz-per-unit averages, and one starter market.
    pub fn starter() -> Self {
        let categories: Vec<(Metal, &str, f64)> = vec![
            (Metal::Silver, "40% halves (roll $10 face)", 2.95),
            (Metal::Silver, "90% junk ($1 face)", 0.715),
            (Metal::Silver, "ASE (1 oz)", 1.0),
            (Metal::Silver, "Generic 1 oz round", 1.0),
            (Metal::Silver, "10 oz bar", 10.0),
            (Metal::Gold, "1 oz Gold Eagle", 1.0),
            (Metal::Gold, "1/10 oz Gold Eagle", 0.1),
            (Metal::Gold, "Pre-33 $10 (approx)", 0.48375),
        ];

        let mut snapshot = Snapshot {
            markets: vec![Market {
                id: generate_id(),
                name: "Tri-Cities TN/VA".to_string(),
                radius_miles: 75.0,
                drive_time_hours: 1.0,
                active: true,
            }],
            ..Snapshot::default()
        };

        for (metal, name, oz) in categories {
            snapshot.categories.push(Category {
                id: generate_id(),
                metal,
                name: name.to_string(),
            });
            snapshot.unit_defs.push(UnitDefinition {
                category_name: name.to_string(),
                oz_per_unit: oz,
            });
        }

        snapshot
    }

    // ----- lookups -----

    pub fn market(&self, id: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.id == id)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn categories_for(&self, metal: Metal) -> Vec<&Category> {
        self.categories.iter().filter(|c| c.metal == metal).collect()
    }

    fn category_exists(&self, metal: Metal, name: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.metal == metal && c.name == name)
    }

    /// Usable oz-per-unit for a category name, or `None` when there is no
    /// definition or the stored value is not a positive finite number.
    pub fn oz_per_unit(&self, category_name: &str) -> Option<f64> {
        self.unit_defs
            .iter()
            .find(|u| u.category_name == category_name)
            .map(|u| u.oz_per_unit)
            .filter(|oz| oz.is_finite() && *oz > 0.0)
    }

    /// The at-most-one quote for a (location, metal, category) triple.
    pub fn quote_for(&self, location_id: &str, metal: Metal, category: &str) -> Option<&Quote> {
        self.quotes
            .iter()
            .find(|q| q.location_id == location_id && q.metal == metal && q.category == category)
    }

    pub fn quotes_for(&self, metal: Metal, category: &str) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|q| q.metal == metal && q.category == category)
            .collect()
    }

    /// Locations visible under a market scope.
    pub fn locations_in_scope(&self, scope: &MarketScope) -> Vec<&Location> {
        match scope {
            MarketScope::AllLocations => self.locations.iter().collect(),
            MarketScope::ActiveMarkets => self
                .locations
                .iter()
                .filter(|l| {
                    self.market(&l.market_id)
                        .map(|m| m.active)
                        .unwrap_or(false)
                })
                .collect(),
            MarketScope::Market(id) => self
                .locations
                .iter()
                .filter(|l| &l.market_id == id)
                .collect(),
        }
    }

    // ----- guarded writes -----

    pub fn add_market(
        &mut self,
        name: impl Into<String>,
        radius_miles: f64,
        drive_time_hours: f64,
        active: bool,
    ) -> Result<MarketId, StoreError> {
        check_positive("radius_miles", radius_miles)?;
        check_positive("drive_time_hours", drive_time_hours)?;

        let id = generate_id();
        self.markets.push(Market {
            id: id.clone(),
            name: name.into(),
            radius_miles,
            drive_time_hours,
            active,
        });
        Ok(id)
    }

    pub fn toggle_market_active(&mut self, id: &str) -> Result<bool, StoreError> {
        let market = self
            .markets
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::UnknownMarket(id.to_string()))?;
        market.active = !market.active;
        Ok(market.active)
    }

    pub fn delete_market(&mut self, id: &str) -> Result<(), StoreError> {
        if self.market(id).is_none() {
            return Err(StoreError::UnknownMarket(id.to_string()));
        }
        if self.locations.iter().any(|l| l.market_id == id) {
            return Err(StoreError::MarketHasLocations);
        }
        self.markets.retain(|m| m.id != id);
        Ok(())
    }

    pub fn add_location(&mut self, location: LocationInput) -> Result<LocationId, StoreError> {
        if self.market(&location.market_id).is_none() {
            return Err(StoreError::UnknownMarket(location.market_id));
        }
        if !location.distance_mi.is_finite() || location.distance_mi < 0.0 {
            return Err(StoreError::InvalidDistance(location.distance_mi));
        }
        if !(1..=5).contains(&location.trust_score) {
            return Err(StoreError::InvalidTrustScore(location.trust_score));
        }

        let id = generate_id();
        self.locations.push(Location {
            id: id.clone(),
            market_id: location.market_id,
            name: location.name,
            kind: location.kind,
            city: location.city,
            distance_mi: location.distance_mi,
            trust_score: location.trust_score,
            notes: location.notes,
        });
        Ok(id)
    }

    pub fn delete_location(&mut self, id: &str) -> Result<(), StoreError> {
        if self.location(id).is_none() {
            return Err(StoreError::UnknownLocation(id.to_string()));
        }
        if self.quotes.iter().any(|q| q.location_id == id) {
            return Err(StoreError::LocationHasQuotes);
        }
        self.locations.retain(|l| l.id != id);
        Ok(())
    }

    pub fn add_category(
        &mut self,
        metal: Metal,
        name: impl Into<String>,
    ) -> Result<CategoryId, StoreError> {
        let name = name.into();
        let duplicate = self
            .categories
            .iter()
            .any(|c| c.metal == metal && c.name.eq_ignore_ascii_case(&name));
        if duplicate {
            return Err(StoreError::DuplicateCategory { metal, name });
        }

        let id = generate_id();
        self.categories.push(Category {
            id: id.clone(),
            metal,
            name,
        });
        Ok(id)
    }

    /// Deleting a category also drops its unit definition; both are
    /// blocked while any quote still references the (name, metal) pair.
    pub fn delete_category(&mut self, id: &str) -> Result<(), StoreError> {
        let Some(category) = self.categories.iter().find(|c| c.id == id).cloned() else {
            return Err(StoreError::UnknownCategoryId(id.to_string()));
        };
        let in_use = self
            .quotes
            .iter()
            .any(|q| q.metal == category.metal && q.category == category.name);
        if in_use {
            return Err(StoreError::CategoryInUse);
        }
        self.categories.retain(|c| c.id != id);
        self.unit_defs.retain(|u| u.category_name != category.name);
        Ok(())
    }

    pub fn set_unit_def(&mut self, category_name: &str, oz_per_unit: f64) -> Result<(), StoreError> {
        check_positive("oz_per_unit", oz_per_unit)?;

        if let Some(def) = self
            .unit_defs
            .iter_mut()
            .find(|u| u.category_name == category_name)
        {
            def.oz_per_unit = oz_per_unit;
        } else {
            self.unit_defs.push(UnitDefinition {
                category_name: category_name.to_string(),
                oz_per_unit,
            });
        }
        Ok(())
    }

    /// Backfills an oz-per-unit of 1.0 for any category missing a
    /// definition, so freshly added categories price immediately.
    pub fn ensure_unit_defaults(&mut self) {
        let missing: Vec<String> = self
            .categories
            .iter()
            .filter(|c| !self.unit_defs.iter().any(|u| u.category_name == c.name))
            .map(|c| c.name.clone())
            .collect();
        for name in missing {
            self.unit_defs.push(UnitDefinition {
                category_name: name,
                oz_per_unit: 1.0,
            });
        }
    }

    /// Inserts or replaces the quote for (location, metal, category).
    ///
    /// Percentages outside [0, 1] are rejected here rather than clamped,
    /// so everything downstream can trust the stored range.
    pub fn upsert_quote(&mut self, input: QuoteInput) -> Result<QuoteId, StoreError> {
        check_pct("buy_pct_melt", input.buy_pct_melt)?;
        check_pct("sell_pct_melt", input.sell_pct_melt)?;
        if !input.flat_premium.is_finite() {
            return Err(StoreError::NonFiniteNumber {
                field: "flat_premium",
            });
        }
        if self.location(&input.location_id).is_none() {
            return Err(StoreError::UnknownLocation(input.location_id));
        }
        if !self.category_exists(input.metal, &input.category) {
            return Err(StoreError::UnknownCategory {
                metal: input.metal,
                name: input.category,
            });
        }

        let now = SystemTime::now();
        if let Some(existing) = self.quotes.iter_mut().find(|q| {
            q.location_id == input.location_id
                && q.metal == input.metal
                && q.category == input.category
        }) {
            existing.buy_pct_melt = input.buy_pct_melt;
            existing.sell_pct_melt = input.sell_pct_melt;
            existing.flat_premium = input.flat_premium;
            existing.notes = input.notes;
            existing.last_updated = now;
            return Ok(existing.id.clone());
        }

        let id = generate_id();
        self.quotes.push(Quote {
            id: id.clone(),
            location_id: input.location_id,
            metal: input.metal,
            category: input.category,
            buy_pct_melt: input.buy_pct_melt,
            sell_pct_melt: input.sell_pct_melt,
            flat_premium: input.flat_premium,
            notes: input.notes,
            last_updated: now,
        });
        Ok(id)
    }

    pub fn delete_quote(&mut self, id: &str) {
        self.quotes.retain(|q| q.id != id);
    }
}

/// Fields accepted by [`Snapshot::add_location`].
#[derive(Clone, Debug, PartialEq)]
pub struct LocationInput {
    pub market_id: MarketId,
    pub name: String,
    pub kind: String,
    pub city: String,
    pub distance_mi: f64,
    pub trust_score: u8,
    pub notes: String,
}

fn check_positive(field: &'static str, value: f64) -> Result<(), StoreError> {
    if !value.is_finite() {
        return Err(StoreError::NonFiniteNumber { field });
    }
    if value <= 0.0 {
        return Err(StoreError::NonPositiveValue { field });
    }
    Ok(())
}

fn check_pct(field: &'static str, value: Option<f64>) -> Result<(), StoreError> {
    match value {
        None => Ok(()),
        Some(v) if v.is_finite() && (0.0..=1.0).contains(&v) => Ok(()),
        Some(v) => Err(StoreError::OutOfRangePercentage { field, value: v }),
    }
}
