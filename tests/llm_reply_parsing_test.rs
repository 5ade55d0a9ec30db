// ABOUTME: Integration tests for decoding noisy model replies into meal parses and dose checks
// ABOUTME: Covers prose preambles, braces inside strings, multiple objects and lenient numbers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs, clippy::float_cmp)]

use pharmora_server::errors::ErrorCode;
use pharmora_server::llm::extract_json;
use pharmora_server::llm::inference::{parse_dose_reply, parse_meal_reply};

const NON_FOOD_REPLY: &str = r#"Sure! The photo shows a keyboard, not a meal.

{"is_food_image": false, "match_score": 0.1, "items": [
  {"name": "unknown {object}", "qty": {"amount": 1, "unit": "piece"}, "est_grams": 1,
   "conf_image": 0.0, "conf_text": 0.1}
], "macros_llm": {"carbs_g": 0, "protein_g": 0, "fat_g": 0, "fiber_g": null, "calories_kcal": null},
"notes": "Not food. Values are placeholders \"{}\"."}

Let me know if you need anything else."#;

#[test]
fn test_braces_inside_strings_do_not_break_extraction() {
    let parse = parse_meal_reply(NON_FOOD_REPLY).unwrap();

    assert!(!parse.is_food_image);
    assert_eq!(parse.items[0].name, "unknown {object}");
    assert_eq!(parse.macros_llm.fiber_g, 0.0);
    assert_eq!(parse.macros_llm.calories_kcal, 0.0);
    assert!(parse.notes.unwrap().contains("{}"));
}

#[test]
fn test_first_valid_object_wins() {
    let text = r#"Draft: {"dose_units": 4.0,} final answer: {"dose_units": 9.9}"#;
    assert_eq!(parse_dose_reply(text), Some(4.0));

    let value = extract_json(r#"noise {not json} then {"a": {"b": [1, 2,]}}"#).unwrap();
    assert_eq!(value["a"]["b"][1], 2);
}

#[test]
fn test_dose_reply_shapes() {
    assert_eq!(parse_dose_reply(r#"{"dose_units": 3}"#), Some(3.0));
    assert_eq!(parse_dose_reply("```json\n{\"dose_units\": \" 2.5 \"}\n```"), Some(2.5));
    assert_eq!(parse_dose_reply(r#"{"units": 3}"#), None);
    assert_eq!(parse_dose_reply(r#"{"dose_units": null}"#), None);
    assert_eq!(parse_dose_reply(r#"{"dose_units": "NaN"}"#), None);
    assert_eq!(parse_dose_reply(""), None);
}

#[test]
fn test_meal_reply_failures_keep_their_codes() {
    let err = parse_meal_reply("The image is too blurry to analyze.").unwrap_err();
    assert_eq!(err.code, ErrorCode::NoStructuredDataFound);

    let err = parse_meal_reply(r#"{"is_food_image": true, "match_score": "high"}"#).unwrap_err();
    assert_eq!(err.code, ErrorCode::InferenceMalformed);

    let negative_grams = r#"{"is_food_image": true, "match_score": 0.5, "items": [
        {"name": "toast", "qty": {"amount": 1, "unit": "slice"}, "est_grams": -30,
         "conf_image": 0.5, "conf_text": 0.5}],
        "macros_llm": {"carbs_g": 15, "protein_g": 3, "fat_g": 1}}"#;
    let err = parse_meal_reply(negative_grams).unwrap_err();
    assert_eq!(err.code, ErrorCode::InferenceMalformed);
    assert!(err.message.contains("est_grams"));
}
