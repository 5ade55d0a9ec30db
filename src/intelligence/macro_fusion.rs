// ABOUTME: Blends the model's macro estimate with database-derived macros by coverage and agreement
// ABOUTME: Computes the lookup weight, the fused profile, and the confidence score
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Macro Fusion
//!
//! `w_lookup = clamp((coverage + match_score) / 2, 0, 1)` and
//! `fused = (1 - w_lookup) * llm + w_lookup * lookup`, field by field.
//! With no lookup hits the model's profile is returned untouched.
//!
//! The averaging of coverage and `match_score` has no empirical calibration
//! behind it; treat both halves of the weight as tunables.

use pharmora_core::models::{FusedMacros, MacroProfile, MealParseResult};

use super::ingredient_ranking::LookupSummary;

/// Weight given to the lookup-derived profile
#[must_use]
pub fn lookup_weight(coverage: f64, match_score: f64) -> f64 {
    ((coverage + match_score) / 2.0).clamp(0.0, 1.0)
}

/// Confidence attached to the output: `clamp(0.5 * match_score + 0.5 * coverage, 0, 1)`
#[must_use]
pub fn confidence(match_score: f64, coverage: f64) -> f64 {
    0.5f64.mul_add(match_score, 0.5 * coverage).clamp(0.0, 1.0)
}

/// Blend `llm` with `lookup`; identity on `llm` when `lookup` is absent
#[must_use]
pub fn fuse_profiles(llm: &MacroProfile, lookup: Option<&MacroProfile>, weight: f64) -> MacroProfile {
    lookup.map_or(*llm, |lookup| llm.blend(lookup, weight.clamp(0.0, 1.0)))
}

/// Fused macros for one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionOutcome {
    /// Unrounded fused profile, used for dosing
    pub profile: MacroProfile,
    /// Rounded profile with confidence, returned to the caller
    pub macros: FusedMacros,
    /// Weight that was applied to the lookup profile
    pub lookup_weight: f64,
}

/// Fuse a meal parse with the lookup fan-out result
#[must_use]
pub fn fuse(parse: &MealParseResult, lookups: &LookupSummary) -> FusionOutcome {
    let coverage = lookups.coverage();
    let weight = lookup_weight(coverage, parse.match_score);
    let profile = fuse_profiles(&parse.macros_llm, lookups.totals.as_ref(), weight);

    FusionOutcome {
        profile,
        macros: FusedMacros::from_profile(&profile, confidence(parse.match_score, coverage)),
        lookup_weight: weight,
    }
}
