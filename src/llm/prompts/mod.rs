// ABOUTME: Prompt templates for meal parsing and dose sanity checks
// ABOUTME: The meal schema prompt is loaded at compile time; the dose check is a JSON payload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

use pharmora_core::models::DoseParams;
use serde_json::json;

/// Schema instructions for the meal-parse call; the description is appended
pub const MEAL_PARSE_PROMPT: &str = include_str!("meal_parse.md");

/// Formula the dose check is asked to evaluate
pub const DOSE_FORMULA: &str =
    "dose = carbs/ICR + max(0,(BG-target)/ISF) - IOB; cap to [0, 0.2*TDD]";

/// Build the meal-parse prompt for a free-text description
#[must_use]
pub fn meal_parse_prompt(description: &str) -> String {
    format!("{MEAL_PARSE_PROMPT}{description}\n")
}

/// Build the dose-check prompt: inputs, formula, and the expected reply shape
#[must_use]
pub fn dose_check_prompt(carbs_g: f64, params: &DoseParams) -> String {
    let payload = json!({
        "carbs_g": carbs_g,
        "ICR": params.icr,
        "ISF": params.isf,
        "target": params.target,
        "BG": params.bg,
        "IOB": params.iob,
        "TDD": params.tdd,
        "formula": DOSE_FORMULA,
        "return": "JSON with { \"dose_units\": number }",
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_prompt_ends_with_description() {
        let prompt = meal_parse_prompt("two eggs and toast");
        assert!(prompt.starts_with("Return STRICT JSON ONLY"));
        assert!(prompt.trim_end().ends_with("Meal description:\ntwo eggs and toast"));
    }

    #[test]
    fn test_dose_prompt_is_json_with_null_bg() {
        let prompt = dose_check_prompt(60.0, &DoseParams::default());
        let value: serde_json::Value = serde_json::from_str(&prompt).unwrap();
        assert_eq!(value["carbs_g"], 60.0);
        assert!(value["BG"].is_null());
        assert_eq!(value["TDD"], 40.0);
    }
}
