// ABOUTME: Meal parse models produced by the inference step and consumed downstream
// ABOUTME: MealParseResult, MealItem, Quantity, MacroProfile, and the fused output profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer, Serialize};

use super::round1;

/// Treat an explicit `null` the same as a missing field (defaults to 0)
fn zero_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Amount and unit as the user or model described a portion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Numeric amount (e.g. 2)
    pub amount: f64,
    /// Free-text unit (e.g. "slices", "cup")
    pub unit: String,
}

/// One ingredient the model recognized in the meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    /// Ingredient name, used as the nutrition search term
    pub name: String,
    /// Portion as described
    pub qty: Quantity,
    /// Estimated mass in grams (> 0)
    pub est_grams: f64,
    /// Confidence the item is visible in the photo, in [0, 1]
    pub conf_image: f64,
    /// Confidence the item is named in the description, in [0, 1]
    pub conf_text: f64,
}

impl MealItem {
    /// Lookup priority: heavier, better-attested items first
    #[must_use]
    pub fn rank_score(&self) -> f64 {
        self.est_grams * (self.conf_image + self.conf_text)
    }
}

/// Carbohydrate, protein, fat, fiber (grams) and energy (kcal)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroProfile {
    /// Carbohydrates (g)
    pub carbs_g: f64,
    /// Protein (g)
    pub protein_g: f64,
    /// Fat (g)
    pub fat_g: f64,
    /// Fiber (g), 0 when not reported
    #[serde(default, deserialize_with = "zero_if_null")]
    pub fiber_g: f64,
    /// Energy (kcal), 0 when not reported
    #[serde(default, deserialize_with = "zero_if_null")]
    pub calories_kcal: f64,
}

impl MacroProfile {
    /// All-zero profile, the identity for [`MacroProfile::accumulate`]
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            carbs_g: 0.0,
            protein_g: 0.0,
            fat_g: 0.0,
            fiber_g: 0.0,
            calories_kcal: 0.0,
        }
    }

    /// Multiply every field by `factor`
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            carbs_g: self.carbs_g * factor,
            protein_g: self.protein_g * factor,
            fat_g: self.fat_g * factor,
            fiber_g: self.fiber_g * factor,
            calories_kcal: self.calories_kcal * factor,
        }
    }

    /// Field-wise sum into `self`
    pub fn accumulate(&mut self, other: &Self) {
        self.carbs_g += other.carbs_g;
        self.protein_g += other.protein_g;
        self.fat_g += other.fat_g;
        self.fiber_g += other.fiber_g;
        self.calories_kcal += other.calories_kcal;
    }

    /// Field-wise `(1 - weight) * self + weight * other`
    #[must_use]
    pub fn blend(&self, other: &Self, weight: f64) -> Self {
        let keep = 1.0 - weight;
        Self {
            carbs_g: self.carbs_g.mul_add(keep, other.carbs_g * weight),
            protein_g: self.protein_g.mul_add(keep, other.protein_g * weight),
            fat_g: self.fat_g.mul_add(keep, other.fat_g * weight),
            fiber_g: self.fiber_g.mul_add(keep, other.fiber_g * weight),
            calories_kcal: self.calories_kcal.mul_add(keep, other.calories_kcal * weight),
        }
    }

    /// True when carbs, protein, fat and fiber are all zero
    ///
    /// Calories are deliberately ignored: placeholder database records often
    /// carry an energy value with no macro breakdown.
    #[must_use]
    pub fn core_fields_all_zero(&self) -> bool {
        [self.carbs_g, self.protein_g, self.fat_g, self.fiber_g]
            .iter()
            .all(|v| *v == 0.0)
    }

    /// Every field finite and non-negative
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [
            self.carbs_g,
            self.protein_g,
            self.fat_g,
            self.fiber_g,
            self.calories_kcal,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Structured meal interpretation returned by the meal-parse inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealParseResult {
    /// Whether the photo (if any) looks like food
    pub is_food_image: bool,
    /// Model's self-reported agreement between photo and description, in [0, 1]
    pub match_score: f64,
    /// Recognized ingredients (non-empty)
    pub items: Vec<MealItem>,
    /// Model's own macro estimate for the whole meal
    pub macros_llm: MacroProfile,
    /// Free-form remarks from the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MealParseResult {
    /// Check range constraints that the JSON types alone cannot express
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if !unit_interval(self.match_score) {
            return Err(format!("match_score {} outside [0, 1]", self.match_score));
        }
        if self.items.is_empty() {
            return Err("items must contain at least one entry".to_owned());
        }
        for (index, item) in self.items.iter().enumerate() {
            if !(item.est_grams.is_finite() && item.est_grams > 0.0) {
                return Err(format!("items[{index}].est_grams must be positive"));
            }
            if !unit_interval(item.conf_image) {
                return Err(format!("items[{index}].conf_image outside [0, 1]"));
            }
            if !unit_interval(item.conf_text) {
                return Err(format!("items[{index}].conf_text outside [0, 1]"));
            }
            if !item.qty.amount.is_finite() {
                return Err(format!("items[{index}].qty.amount must be a number"));
            }
        }
        if !self.macros_llm.is_valid() {
            return Err("macros_llm fields must be non-negative numbers".to_owned());
        }
        Ok(())
    }
}

fn unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Final macro profile returned to the caller, rounded, with a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusedMacros {
    /// Carbohydrates (g), one decimal
    pub carbs_g: f64,
    /// Protein (g), one decimal
    pub protein_g: f64,
    /// Fat (g), one decimal
    pub fat_g: f64,
    /// Fiber (g), one decimal
    pub fiber_g: f64,
    /// Energy (kcal), whole number
    pub calories_kcal: f64,
    /// `clamp(0.5 * match_score + 0.5 * coverage, 0, 1)`
    pub confidence: f64,
}

impl FusedMacros {
    /// Round a raw fused profile for output and attach `confidence`
    #[must_use]
    pub fn from_profile(profile: &MacroProfile, confidence: f64) -> Self {
        Self {
            carbs_g: round1(profile.carbs_g),
            protein_g: round1(profile.protein_g),
            fat_g: round1(profile.fat_g),
            fiber_g: round1(profile.fiber_g),
            calories_kcal: profile.calories_kcal.round(),
            confidence,
        }
    }
}
