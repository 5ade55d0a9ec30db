// ABOUTME: Deterministic insulin bolus calculation with a TDD-based safety ceiling
// ABOUTME: Meal, correction and IOB terms, conservative reconciliation with a second opinion, rationale text
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Bolus Calculator
//!
//! ```text
//! meal       = carbs_g / icr
//! correction = (bg - target) / isf   if bg > target, else 0
//! raw        = meal + correction - iob
//! local      = round1(clamp(raw, 0, 0.2 * tdd))
//! final      = round1(max(0, min(local, check.unwrap_or(local))))
//! ```
//!
//! The second opinion can only lower the recommendation, never raise it.

use pharmora_core::constants::dosing::DISCLAIMER;
use pharmora_core::models::{round1, DoseParams, DoseResult};

/// Every term of the deterministic formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalDose {
    /// `carbs_g / icr`
    pub meal_units: f64,
    /// `(bg - target) / isf` when BG is above target, else 0
    pub correction_units: f64,
    /// `meal + correction - iob`, unclamped
    pub raw_units: f64,
    /// `0.2 * tdd`
    pub cap_units: f64,
    /// `raw` clamped to `[0, cap]`, one decimal
    pub units: f64,
}

/// Evaluate the deterministic bolus formula
#[must_use]
pub fn local_dose(carbs_g: f64, params: &DoseParams) -> LocalDose {
    let meal_units = carbs_g / params.icr;
    let correction_units = match params.bg {
        Some(bg) if bg > params.target => (bg - params.target) / params.isf,
        _ => 0.0,
    };
    let raw_units = meal_units + correction_units - params.iob;
    let cap_units = params.max_bolus();

    LocalDose {
        meal_units,
        correction_units,
        raw_units,
        cap_units,
        units: round1(raw_units.clamp(0.0, cap_units)),
    }
}

/// Reconcile the deterministic dose with an optional second opinion
///
/// Non-finite opinions are ignored. The result never exceeds `local_units`
/// and never drops below zero.
#[must_use]
pub fn reconcile(local_units: f64, check_units: Option<f64>) -> f64 {
    let candidate = check_units
        .filter(|units| units.is_finite())
        .unwrap_or(local_units);
    round1(local_units.min(candidate).max(0.0))
}

/// Human-readable derivation of the deterministic dose
#[must_use]
pub fn rationale(carbs_g: f64, params: &DoseParams, dose: &LocalDose) -> String {
    let correction = params.bg.map_or_else(
        || "no correction (BG not provided)".to_owned(),
        |bg| {
            format!(
                "{bg}\u{2192}{} mg/dL via ISF {} \u{21d2} {}U",
                params.target,
                params.isf,
                round1(dose.correction_units)
            )
        },
    );

    format!(
        "Meal: {}g carbs \u{f7} ICR {} \u{21d2} {}U; Correction: {correction}; IOB: \u{2212}{}U; \
         capped at \u{2264} {}U (20% of TDD).",
        round1(carbs_g),
        params.icr,
        round1(dose.meal_units),
        round1(params.iob),
        round1(dose.cap_units),
    )
}

/// Full recommendation: reconciled units, rationale, and disclaimer
#[must_use]
pub fn recommend(carbs_g: f64, params: &DoseParams, check_units: Option<f64>) -> DoseResult {
    let local = local_dose(carbs_g, params);
    DoseResult {
        units: reconcile(local.units, check_units),
        rationale: rationale(carbs_g, params, &local),
        disclaimer: DISCLAIMER.to_owned(),
    }
}
