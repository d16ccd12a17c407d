//! Per-location opportunity scoring for the heatmap view.
//!
//! Answers "is this dealer's pricing attractive in isolation", with no
//! counter-party, trip cost, or quantity involved, unlike the two-sided
//! economics in [`super::arbitrage`].

use super::entities::{LocationId, Metal};
use super::snapshot::{MarketScope, Snapshot};

// Band cutoffs are fixed, unlike the configurable arbitrage thresholds.
const HOT_THRESHOLD: f64 = 0.65;
const OKAY_THRESHOLD: f64 = 0.50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeatBand {
    Cold,
    Okay,
    Hot,
}

impl HeatBand {
    fn for_score(score: f64) -> Self {
        if score >= HOT_THRESHOLD {
            HeatBand::Hot
        } else if score >= OKAY_THRESHOLD {
            HeatBand::Okay
        } else {
            HeatBand::Cold
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HeatBand::Hot => "Hot",
            HeatBand::Okay => "Okay",
            HeatBand::Cold => "Cold",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpportunityScore {
    pub band: HeatBand,
    pub value: f64,
}

/// Blended attractiveness of one (location, metal, category) cell.
///
/// Buy score is `1 - buy_pct` (a dealer selling near melt is a poor
/// source); sell score is `sell_pct` (a dealer paying near melt is a
/// good outlet). With both sides quoted the score is their mean; with
/// one, that side alone; with neither (or no quote at all), `None`.
pub fn score_opportunity(
    snapshot: &Snapshot,
    location_id: &str,
    metal: Metal,
    category_name: &str,
) -> Option<OpportunityScore> {
    let quote = snapshot.quote_for(location_id, metal, category_name)?;

    let buy_score = quote
        .buy_pct_melt
        .filter(|p| p.is_finite())
        .map(|p| 1.0 - p);
    let sell_score = quote.sell_pct_melt.filter(|p| p.is_finite());

    let value = match (buy_score, sell_score) {
        (Some(b), Some(s)) => (b + s) / 2.0,
        (Some(b), None) => b,
        (None, Some(s)) => s,
        (None, None) => return None,
    };

    Some(OpportunityScore {
        band: HeatBand::for_score(value),
        value,
    })
}

/// One heatmap row: a location and its cell per category column.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapRow {
    pub location_id: LocationId,
    pub location_name: String,
    pub cells: Vec<Option<OpportunityScore>>,
}

/// The full grid for a metal under a market scope. Column order matches
/// `categories`; a `None` cell means no quote to score.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapGrid {
    pub categories: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

pub fn heatmap_grid(snapshot: &Snapshot, scope: &MarketScope, metal: Metal) -> HeatmapGrid {
    let categories: Vec<String> = snapshot
        .categories_for(metal)
        .into_iter()
        .map(|c| c.name.clone())
        .collect();

    let rows = snapshot
        .locations_in_scope(scope)
        .into_iter()
        .map(|location| HeatmapRow {
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            cells: categories
                .iter()
                .map(|name| score_opportunity(snapshot, &location.id, metal, name))
                .collect(),
        })
        .collect();

    HeatmapGrid { categories, rows }
}
