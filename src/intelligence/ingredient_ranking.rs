// ABOUTME: Ingredient ranking and concurrent nutrition lookup fan-out
// ABOUTME: Picks the top-K parsed items by mass and confidence, looks them up in parallel, merges by index
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Ingredient Ranking & Lookup Fan-out
//!
//! Items are scored by `est_grams * (conf_image + conf_text)` so that heavy,
//! well-attested ingredients are looked up first. Only the top `max_items`
//! are looked up; the rest still count through the model's own estimate.
//!
//! Lookups run concurrently and are joined with `join_all`, which waits for
//! every lookup to settle. Each lookup has its own deadline, so a slow item
//! costs at most one deadline and never delays the others beyond it.
//! Results land in per-index slots and are merged in rank order.

use std::cmp::Ordering;
use std::time::Duration;

use futures_util::future::join_all;
use pharmora_core::models::{MacroProfile, MealItem};
use tracing::debug;

use crate::external::NutritionLookup;

/// Top `max_items` items by descending rank score
///
/// The sort is stable, so items with equal scores keep their parse order and
/// the selection is reproducible.
#[must_use]
pub fn rank_items(items: &[MealItem], max_items: usize) -> Vec<&MealItem> {
    let mut ranked: Vec<&MealItem> = items.iter().collect();
    ranked.sort_by(|a, b| {
        b.rank_score()
            .partial_cmp(&a.rank_score())
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(max_items);
    ranked
}

/// Aggregated result of the lookup fan-out
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSummary {
    /// Number of lookups issued
    pub attempted: usize,
    /// Number of lookups that produced a usable profile
    pub hits: usize,
    /// Sum of `per_100g * est_grams / 100` over hits; `None` when `hits == 0`
    pub totals: Option<MacroProfile>,
}

impl LookupSummary {
    /// Summary for a fan-out that issued nothing
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            attempted: 0,
            hits: 0,
            totals: None,
        }
    }

    /// `hits / attempted`, or 0 when nothing was attempted
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.hits as f64 / self.attempted as f64
        }
    }
}

/// Merge per-item lookup results, in rank order, into a [`LookupSummary`]
#[must_use]
pub fn summarize_lookups(ranked: &[&MealItem], results: &[Option<MacroProfile>]) -> LookupSummary {
    let mut totals = MacroProfile::zero();
    let mut hits = 0;

    for (item, result) in ranked.iter().zip(results) {
        if let Some(per_100g) = result {
            totals.accumulate(&per_100g.scaled(item.est_grams / 100.0));
            hits += 1;
        }
    }

    LookupSummary {
        attempted: ranked.len(),
        hits,
        totals: (hits > 0).then_some(totals),
    }
}

/// Look up every ranked item concurrently, each under `deadline`
pub async fn fan_out_lookups(
    lookup: &dyn NutritionLookup,
    ranked: &[&MealItem],
    deadline: Duration,
) -> LookupSummary {
    if ranked.is_empty() {
        return LookupSummary::empty();
    }

    let results = join_all(
        ranked
            .iter()
            .map(|item| lookup.per_100g(&item.name, deadline)),
    )
    .await;

    let summary = summarize_lookups(ranked, &results);
    debug!(
        attempted = summary.attempted,
        hits = summary.hits,
        coverage = summary.coverage(),
        "Lookup fan-out settled"
    );
    summary
}
