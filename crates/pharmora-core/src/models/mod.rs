// ABOUTME: Data models shared by the meal estimation pipeline
// ABOUTME: Re-exports meal parse, macro profile, and dose types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Core data models
//!
//! Every value here is created fresh per request and discarded once the
//! response is serialized.

/// Insulin dosing parameters and results
pub mod dose;
/// Meal parse results and macro profiles
pub mod meal;

pub use dose::{DoseParams, DoseResult};
pub use meal::{FusedMacros, MacroProfile, MealItem, MealParseResult, Quantity};

/// Round to one decimal place
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
