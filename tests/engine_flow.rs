//! End-to-end engine flow over a seeded snapshot: build reference data
//! through the guarded write surface, evaluate arbitrage, score the
//! heatmap, and round-trip the snapshot as JSON the way a host app's
//! persistence layer would.

use bullion_scanner::domain::snapshot::{LocationInput, QuoteInput};
use bullion_scanner::{
    evaluate_arbitrage, heatmap_grid, melt_per_unit, score_opportunity, ArbQuery, ArbRating,
    HeatBand, MarketScope, Metal, Snapshot,
};

fn location(market_id: &str, name: &str, city: &str, distance_mi: f64, trust: u8) -> LocationInput {
    LocationInput {
        market_id: market_id.to_string(),
        name: name.to_string(),
        kind: "LCS".to_string(),
        city: city.to_string(),
        distance_mi,
        trust_score: trust,
        notes: String::new(),
    }
}

fn quote(
    location_id: &str,
    metal: Metal,
    category: &str,
    buy: Option<f64>,
    sell: Option<f64>,
    flat: f64,
) -> QuoteInput {
    QuoteInput {
        location_id: location_id.to_string(),
        metal,
        category: category.to_string(),
        buy_pct_melt: buy,
        sell_pct_melt: sell,
        flat_premium: flat,
        notes: String::new(),
    }
}

/// Three dealers across two markets with mixed one- and two-sided quotes.
fn tri_cities_snapshot() -> (Snapshot, Vec<String>) {
    let mut snapshot = Snapshot::starter();
    let home = snapshot.markets[0].id.clone();
    let away = snapshot.add_market("Asheville NC", 120.0, 2.0, true).unwrap();

    let shop1 = snapshot
        .add_location(location(&home, "Shop1", "Bristol", 20.0, 4))
        .unwrap();
    let shop2 = snapshot
        .add_location(location(&home, "Shop2", "Johnson City", 30.0, 5))
        .unwrap();
    let shop3 = snapshot
        .add_location(location(&away, "Mountain Coin", "Asheville", 110.0, 3))
        .unwrap();

    snapshot
        .upsert_quote(quote(&shop1, Metal::Silver, "ASE (1 oz)", Some(0.90), None, 0.0))
        .unwrap();
    snapshot
        .upsert_quote(quote(&shop2, Metal::Silver, "ASE (1 oz)", None, Some(0.98), 0.0))
        .unwrap();
    snapshot
        .upsert_quote(quote(
            &shop3,
            Metal::Silver,
            "ASE (1 oz)",
            Some(0.85),
            Some(0.96),
            -0.25,
        ))
        .unwrap();

    (snapshot, vec![shop1, shop2, shop3])
}

#[test]
fn home_market_pair_nets_a_loss_and_rates_noise() {
    let (snapshot, shops) = tri_cities_snapshot();
    assert_eq!(
        melt_per_unit(&snapshot, Metal::Silver, "ASE (1 oz)").unwrap(),
        85.0
    );

    let home = snapshot.markets[0].id.clone();
    let query = ArbQuery {
        metal: Metal::Silver,
        category: "ASE (1 oz)".to_string(),
        quantity: 10.0,
        scope: MarketScope::Market(home),
    };
    let outcome = evaluate_arbitrage(&snapshot, &query).unwrap();

    // Only Shop1 buys-side x Shop2 sell-side within the home market.
    assert_eq!(outcome.total_pairs, 1);
    let pair = &outcome.results[0];
    assert_eq!(pair.buy_location_id, shops[0]);
    assert_eq!(pair.sell_location_id, shops[1]);
    assert!((pair.buy_price_per_unit - 76.50).abs() < 1e-9);
    assert!((pair.sell_proceeds_per_unit - 83.30).abs() < 1e-9);
    assert!((pair.net_profit - -30.0).abs() < 1e-9);
    assert_eq!(pair.rating(&snapshot.settings), ArbRating::Noise);
}

#[test]
fn active_market_scope_widens_the_search_and_keeps_ordering() {
    let (snapshot, _) = tri_cities_snapshot();
    let query = ArbQuery {
        metal: Metal::Silver,
        category: "ASE (1 oz)".to_string(),
        quantity: 10.0,
        scope: MarketScope::ActiveMarkets,
    };
    let outcome = evaluate_arbitrage(&snapshot, &query).unwrap();

    // Two buy candidates x two sell candidates, same-location included.
    assert_eq!(outcome.total_pairs, 4);
    assert_eq!(outcome.skipped_dangling, 0);
    for window in outcome.results.windows(2) {
        assert!(window[0].net_profit >= window[1].net_profit);
    }
    assert!(outcome.results.iter().any(|p| p.is_same_location()));
    for pair in &outcome.results {
        assert!(snapshot.location(&pair.buy_location_id).is_some());
        assert!(snapshot.location(&pair.sell_location_id).is_some());
    }
}

#[test]
fn heatmap_reflects_quote_sidedness() {
    let (snapshot, shops) = tri_cities_snapshot();

    // Shop1 only buys-side: score = 1 - 0.90 = 0.10 -> Cold.
    let s1 = score_opportunity(&snapshot, &shops[0], Metal::Silver, "ASE (1 oz)").unwrap();
    assert_eq!(s1.band, HeatBand::Cold);

    // Shop2 only sell-side: score = 0.98 -> Hot.
    let s2 = score_opportunity(&snapshot, &shops[1], Metal::Silver, "ASE (1 oz)").unwrap();
    assert_eq!(s2.band, HeatBand::Hot);

    // Shop3 both sides: ((1 - 0.85) + 0.96) / 2 = 0.555 -> Okay.
    let s3 = score_opportunity(&snapshot, &shops[2], Metal::Silver, "ASE (1 oz)").unwrap();
    assert!((s3.value - 0.555).abs() < 1e-12);
    assert_eq!(s3.band, HeatBand::Okay);

    let grid = heatmap_grid(&snapshot, &MarketScope::ActiveMarkets, Metal::Silver);
    assert_eq!(grid.rows.len(), 3);
    // No gold categories leak into the silver grid.
    assert!(grid.categories.iter().all(|c| !c.contains("Gold")));
}

#[test]
fn snapshot_round_trips_through_json() {
    let (snapshot, _) = tri_cities_snapshot();
    let json = serde_json::to_string_pretty(&snapshot).unwrap();
    let restored: Snapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.quotes.len(), snapshot.quotes.len());
    assert_eq!(restored.settings, snapshot.settings);

    // The restored snapshot evaluates identically.
    let query = ArbQuery {
        metal: Metal::Silver,
        category: "ASE (1 oz)".to_string(),
        quantity: 10.0,
        scope: MarketScope::ActiveMarkets,
    };
    let before = evaluate_arbitrage(&snapshot, &query).unwrap();
    let after = evaluate_arbitrage(&restored, &query).unwrap();
    assert_eq!(before, after);
}
