// ABOUTME: Structured inference capability used by the meal estimation pipeline
// ABOUTME: Meal parsing and dose sanity checks over an LlmProvider, each under its own deadline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Structured Inference
//!
//! [`StructuredInferer`] is the seam between the pipeline and the generative
//! model. It has two call shapes with very different failure policies:
//!
//! - `parse_meal` is the primary parse. Timeouts and unusable replies are
//!   fatal and surface as `InferenceTimeout`, `InferenceMalformed` or
//!   `NoStructuredDataFound`.
//! - `check_dose` is a secondary opinion. Every failure collapses to `None`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pharmora_core::constants::inference;
use pharmora_core::models::{DoseParams, MealParseResult};
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::json_extract::extract_json;
use super::prompts::{dose_check_prompt, meal_parse_prompt};
use super::{GenerationRequest, ImageInput, LlmProvider};
use crate::config::InferenceConfig;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;

/// Everything the meal-parse call needs from the request
#[derive(Debug, Clone, Default)]
pub struct MealPrompt {
    /// Free-text meal description (may be empty)
    pub description: String,
    /// Photo of the meal, already checked against the size ceiling
    pub image: Option<ImageInput>,
}

/// Generative capability with the two call shapes the pipeline uses
#[async_trait]
pub trait StructuredInferer: Send + Sync {
    /// Parse a meal into validated structured data
    ///
    /// # Errors
    ///
    /// Returns `InferenceTimeout` when the deadline expires,
    /// `NoStructuredDataFound` when no JSON can be recovered, and
    /// `InferenceMalformed` for schema violations or transport failures.
    async fn parse_meal(&self, prompt: &MealPrompt) -> AppResult<MealParseResult>;

    /// Independently compute the bolus formula; `None` when unavailable
    async fn check_dose(&self, carbs_g: f64, params: &DoseParams) -> Option<f64>;
}

/// Decode a meal-parse reply into a validated [`MealParseResult`]
///
/// # Errors
///
/// Returns `NoStructuredDataFound` or `InferenceMalformed`.
pub fn parse_meal_reply(text: &str) -> AppResult<MealParseResult> {
    let value = extract_json(text)?;
    let parsed: MealParseResult = serde_json::from_value(value).map_err(|e| {
        AppError::inference_malformed(format!("Meal analysis did not match the schema: {e}"))
    })?;
    parsed.validate().map_err(|reason| {
        AppError::inference_malformed(format!("Meal analysis out of range: {reason}"))
    })?;
    Ok(parsed)
}

/// Read `dose_units` from a dose-check reply, accepting numeric strings
#[must_use]
pub fn parse_dose_reply(text: &str) -> Option<f64> {
    let value = extract_json(text).ok()?;
    let units = match value.get("dose_units")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    units.is_finite().then_some(units)
}

/// [`StructuredInferer`] backed by any [`LlmProvider`]
pub struct GeminiInferer {
    provider: Arc<dyn LlmProvider>,
    parse_model: String,
    check_model: String,
    parse_timeout: Duration,
    check_timeout: Duration,
}

impl GeminiInferer {
    /// Create an inferer with explicit models and deadlines
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &InferenceConfig) -> Self {
        Self {
            provider,
            parse_model: config.parse_model.clone(),
            check_model: config.check_model.clone(),
            parse_timeout: config.parse_timeout(),
            check_timeout: config.check_timeout(),
        }
    }

    fn meal_request(&self, prompt: &MealPrompt) -> GenerationRequest {
        let mut request = GenerationRequest::new(meal_parse_prompt(&prompt.description))
            .with_model(&self.parse_model)
            .with_temperature(inference::PARSE_TEMPERATURE)
            .with_max_tokens(inference::PARSE_MAX_OUTPUT_TOKENS);

        if self.provider.capabilities().supports_json_mode() {
            request = request.with_json_output();
        }
        if let Some(image) = &prompt.image {
            if self.provider.capabilities().supports_vision() {
                request = request.with_image(image.clone());
            } else {
                warn!(
                    provider = self.provider.name(),
                    "Provider has no vision support, parsing from text only"
                );
            }
        }
        request
    }

    fn check_request(&self, carbs_g: f64, params: &DoseParams) -> GenerationRequest {
        let request = GenerationRequest::new(dose_check_prompt(carbs_g, params))
            .with_model(&self.check_model)
            .with_temperature(inference::CHECK_TEMPERATURE)
            .with_max_tokens(inference::CHECK_MAX_OUTPUT_TOKENS);
        if self.provider.capabilities().supports_json_mode() {
            request.with_json_output()
        } else {
            request
        }
    }
}

#[async_trait]
impl StructuredInferer for GeminiInferer {
    #[instrument(skip(self, prompt), fields(has_image = prompt.image.is_some()))]
    async fn parse_meal(&self, prompt: &MealPrompt) -> AppResult<MealParseResult> {
        let request = self.meal_request(prompt);
        let started = Instant::now();

        let outcome = timeout(self.parse_timeout, self.provider.complete(&request)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = match outcome {
            Err(_) => {
                AppLogger::log_inference_call("meal_parse", &self.parse_model, false, elapsed_ms);
                return Err(AppError::inference_timeout(format!(
                    "Meal analysis timed out after {}ms",
                    self.parse_timeout.as_millis()
                )));
            }
            Ok(Err(e)) => {
                AppLogger::log_inference_call("meal_parse", &self.parse_model, false, elapsed_ms);
                // Provider text stays in the logs, clients get a fixed message
                warn!(error = %e, "Meal parse provider call failed");
                return Err(
                    AppError::inference_malformed("Meal analysis service is unavailable")
                        .with_source(e),
                );
            }
            Ok(Ok(response)) => response,
        };

        let parsed = parse_meal_reply(&response.content);
        AppLogger::log_inference_call("meal_parse", &self.parse_model, parsed.is_ok(), elapsed_ms);
        parsed
    }

    #[instrument(skip(self, params))]
    async fn check_dose(&self, carbs_g: f64, params: &DoseParams) -> Option<f64> {
        let request = self.check_request(carbs_g, params);
        let started = Instant::now();

        let outcome = timeout(self.check_timeout, self.provider.complete(&request)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let units = match outcome {
            Err(_) => {
                debug!("Dose check unavailable: deadline expired");
                None
            }
            Ok(Err(e)) => {
                debug!(error = %e, "Dose check unavailable: provider error");
                None
            }
            Ok(Ok(response)) => {
                let units = parse_dose_reply(&response.content);
                if units.is_none() {
                    debug!("Dose check unavailable: reply had no finite dose_units");
                }
                units
            }
        };
        AppLogger::log_inference_call("dose_check", &self.check_model, units.is_some(), elapsed_ms);
        units
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use pharmora_core::errors::ErrorCode;

    #[test]
    fn test_parse_dose_reply_variants() {
        assert_eq!(parse_dose_reply(r#"{"dose_units": 4.2}"#), Some(4.2));
        assert_eq!(parse_dose_reply(r#"{"dose_units": "3.5"}"#), Some(3.5));
        assert_eq!(parse_dose_reply(r#"{"dose_units": null}"#), None);
        assert_eq!(parse_dose_reply(r#"{"units": 2}"#), None);
        assert_eq!(parse_dose_reply("no idea"), None);
    }

    #[test]
    fn test_parse_meal_reply_schema_violation_is_malformed() {
        let err = parse_meal_reply(r#"{"is_food_image": true}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::InferenceMalformed);
    }

    #[test]
    fn test_parse_meal_reply_range_violation_is_malformed() {
        let reply = r#"{"is_food_image": true, "match_score": 2.0,
            "items": [{"name": "rice", "qty": {"amount": 1, "unit": "cup"},
                       "est_grams": 150, "conf_image": 0.5, "conf_text": 0.5}],
            "macros_llm": {"carbs_g": 40, "protein_g": 4, "fat_g": 1}}"#;
        let err = parse_meal_reply(reply).unwrap_err();
        assert_eq!(err.code, ErrorCode::InferenceMalformed);
    }
}
