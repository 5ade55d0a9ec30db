// ABOUTME: Property-style integration tests for ranking, fusion and bolus arithmetic
// ABOUTME: Sweeps input grids to check caps, bounds and ordering hold everywhere
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs, clippy::float_cmp)]

mod common;

use std::time::Duration;

use common::{item, meal_parse, profile};
use pharmora_server::external::MockNutritionLookup;
use pharmora_server::intelligence::{
    confidence, fan_out_lookups, fuse, local_dose, lookup_weight, rank_items, recommend,
    LookupSummary,
};
use pharmora_server::models::{round1, DoseParams};

// ============================================================================
// Bolus bounds
// ============================================================================

fn param_grid() -> Vec<DoseParams> {
    let mut grid = Vec::new();
    for icr in [5.0, 10.0, 15.0] {
        for isf in [20.0, 50.0] {
            for bg in [None, Some(70.0), Some(110.0), Some(250.0), Some(400.0)] {
                for iob in [0.0, 1.5, 6.0] {
                    for tdd in [10.0, 40.0, 80.0] {
                        grid.push(DoseParams {
                            icr,
                            isf,
                            target: 110.0,
                            bg,
                            iob,
                            tdd,
                        });
                    }
                }
            }
        }
    }
    grid
}

#[test]
fn test_dose_always_within_zero_and_cap() {
    for params in param_grid() {
        for carbs in [0.0, 12.5, 45.0, 90.0, 250.0] {
            for check in [None, Some(-1.0), Some(0.0), Some(3.3), Some(100.0), Some(f64::NAN)] {
                let dose = recommend(carbs, &params, check);
                assert!(dose.units >= 0.0, "{params:?} {carbs} {check:?}");
                assert!(
                    dose.units <= round1(params.max_bolus()),
                    "{params:?} {carbs} {check:?} -> {}",
                    dose.units
                );
            }
        }
    }
}

#[test]
fn test_check_never_raises_dose() {
    for params in param_grid() {
        for carbs in [20.0, 60.0, 120.0] {
            let local = local_dose(carbs, &params).units;
            for check in [0.1, 2.0, 5.0, 50.0] {
                let dose = recommend(carbs, &params, Some(check));
                assert!(dose.units <= local, "{params:?} {carbs} {check}");
            }
        }
    }
}

#[test]
fn test_dose_monotonic_in_carbs() {
    let params = DoseParams::default();
    let mut previous = 0.0;
    for carbs in (0..=300).step_by(10) {
        let units = recommend(f64::from(carbs), &params, None).units;
        assert!(units >= previous, "{carbs}g gave {units} < {previous}");
        previous = units;
    }
}

// ============================================================================
// Fusion bounds
// ============================================================================

#[test]
fn test_weight_and_confidence_in_unit_interval() {
    let values = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];
    for coverage in values {
        for match_score in values {
            let w = lookup_weight(coverage, match_score);
            let c = confidence(match_score, coverage);
            assert!((0.0..=1.0).contains(&w));
            assert!((0.0..=1.0).contains(&c));
        }
    }
}

#[test]
fn test_fused_profile_lies_between_sources() {
    let parse = meal_parse(
        vec![item("white rice", 150.0, 0.9, 0.9)],
        profile(20.0, 30.0, 5.0, 1.0, 300.0),
        0.7,
    );
    let lookups = LookupSummary {
        attempted: 2,
        hits: 1,
        totals: Some(profile(60.0, 10.0, 15.0, 3.0, 500.0)),
    };

    let outcome = fuse(&parse, &lookups);

    assert!((outcome.lookup_weight - 0.6).abs() < 1e-9);
    let fused = outcome.profile;
    assert!(fused.carbs_g > 20.0 && fused.carbs_g < 60.0);
    assert!(fused.protein_g > 10.0 && fused.protein_g < 30.0);
    assert!(fused.calories_kcal > 300.0 && fused.calories_kcal < 500.0);
    assert_eq!(outcome.macros.carbs_g, round1(fused.carbs_g));
    assert_eq!(outcome.macros.calories_kcal, fused.calories_kcal.round());
}

#[test]
fn test_no_hits_means_model_profile_unchanged() {
    let llm = profile(44.44, 12.0, 7.0, 2.0, 333.0);
    for match_score in [0.0, 0.5, 1.0] {
        let parse = meal_parse(vec![item("stew", 300.0, 0.5, 0.5)], llm, match_score);
        let lookups = LookupSummary {
            attempted: 3,
            hits: 0,
            totals: None,
        };
        let outcome = fuse(&parse, &lookups);
        assert_eq!(outcome.profile, llm);
        assert!((outcome.macros.confidence - 0.5 * match_score).abs() < 1e-9);
    }
}

// ============================================================================
// Ranking and fan-out
// ============================================================================

#[test]
fn test_ranking_respects_cap_for_any_size() {
    for size in 0_u32..10 {
        let items: Vec<_> = (0..size)
            .map(|i| item(&format!("item {i}"), f64::from(i + 1) * 10.0, 0.5, 0.5))
            .collect();
        for cap in [1, 4, 8] {
            let ranked = rank_items(&items, cap);
            assert_eq!(ranked.len(), items.len().min(cap));
            for pair in ranked.windows(2) {
                assert!(pair[0].rank_score() >= pair[1].rank_score());
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_runs_concurrently_and_merges_by_index() {
    let slow = Duration::from_secs(3);
    let lookup = MockNutritionLookup::new()
        .with_delayed_food("oats", slow, profile(60.0, 13.0, 7.0, 10.0, 380.0))
        .with_delayed_food("banana", slow, profile(23.0, 1.0, 0.3, 2.6, 89.0))
        .with_delayed_food("milk", slow, profile(5.0, 3.4, 3.6, 0.0, 64.0));
    let items = vec![
        item("oats", 50.0, 0.9, 0.9),
        item("banana", 120.0, 0.9, 0.9),
        item("milk", 200.0, 0.9, 0.9),
    ];
    let ranked = rank_items(&items, 4);

    let started = tokio::time::Instant::now();
    let summary = fan_out_lookups(&lookup, &ranked, Duration::from_secs(4)).await;

    // Three 3 s lookups finish together, not in 9 s
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.hits, 3);
    let totals = summary.totals.unwrap();
    // 0.5 * 60 + 1.2 * 23 + 2.0 * 5
    assert!((totals.carbs_g - 67.6).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_deadline_is_per_item() {
    let lookup = MockNutritionLookup::with_staples().with_delayed_food(
        "slow soup",
        Duration::from_secs(10),
        profile(8.0, 2.0, 1.0, 1.0, 50.0),
    );
    let items = vec![item("white rice", 100.0, 0.9, 0.9), item("slow soup", 300.0, 0.9, 0.9)];
    let ranked = rank_items(&items, 4);

    let summary = fan_out_lookups(&lookup, &ranked, Duration::from_secs(4)).await;

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.hits, 1);
    assert!((summary.totals.unwrap().carbs_g - 28.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_fan_out_with_nothing_ranked_is_empty() {
    let lookup = MockNutritionLookup::with_staples();
    let summary = fan_out_lookups(&lookup, &[], Duration::from_secs(1)).await;
    assert_eq!(summary, LookupSummary::empty());
    assert!(lookup.calls().is_empty());
}
