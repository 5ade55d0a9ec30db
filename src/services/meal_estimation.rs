// ABOUTME: Meal estimation pipeline orchestrator from parsed request to fused macros and dose
// ABOUTME: Sequences parse, ranking, lookup fan-out, fusion and dosing, tracking the pipeline stage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Meal estimation service
//!
//! Stages run strictly in order:
//!
//! ```text
//! Received -> Parsing -> Ranking -> LookupFanout -> Fusing -> Dosing -> Responding
//!                |
//!                +-> Failed
//! ```
//!
//! Only `Parsing` (and input validation at `Received`) can fail the request.
//! Lookups degrade to lower coverage and the dose check degrades to the
//! deterministic dose; neither ever reaches `Failed`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pharmora_core::constants::warnings;
use pharmora_core::models::{DoseParams, DoseResult, FusedMacros, MealParseResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::errors::AppResult;
use crate::external::NutritionLookup;
use crate::intelligence::{fan_out_lookups, fuse, rank_items, recommend};
use crate::llm::{ImageInput, MealPrompt, StructuredInferer};

/// Pipeline stage of a single estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Request accepted and validated
    Received,
    /// Waiting on the meal-parse inference call
    Parsing,
    /// Selecting ingredients to look up
    Ranking,
    /// Nutrition lookups in flight
    LookupFanout,
    /// Blending model and database macros
    Fusing,
    /// Computing and cross-checking the bolus
    Dosing,
    /// Response assembled
    Responding,
    /// Aborted by a fatal error
    Failed,
}

impl PipelineStage {
    /// Stable lowercase name used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Parsing => "parsing",
            Self::Ranking => "ranking",
            Self::LookupFanout => "lookup_fanout",
            Self::Fusing => "fusing",
            Self::Dosing => "dosing",
            Self::Responding => "responding",
            Self::Failed => "failed",
        }
    }

    /// Whether `next` is a legal transition from this stage
    #[must_use]
    pub const fn can_advance_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Received, Self::Parsing | Self::Failed)
                | (Self::Parsing, Self::Ranking | Self::Failed)
                | (Self::Ranking, Self::LookupFanout)
                | (Self::LookupFanout, Self::Fusing)
                | (Self::Fusing, Self::Dosing)
                | (Self::Dosing, Self::Responding)
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage tracker for one request
#[derive(Debug)]
struct StageTracker {
    stage: PipelineStage,
}

impl StageTracker {
    const fn new() -> Self {
        Self {
            stage: PipelineStage::Received,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        if !self.stage.can_advance_to(next) {
            warn!(from = %self.stage, to = %next, "Unexpected pipeline transition");
        }
        debug!(from = %self.stage, to = %next, "Pipeline stage");
        self.stage = next;
    }
}

/// Tunables for the pipeline, taken from `ServerConfig`
#[derive(Debug, Clone, Copy)]
pub struct EstimationSettings {
    /// Maximum ranked ingredients looked up
    pub max_items: usize,
    /// Per-ingredient lookup deadline
    pub lookup_timeout: Duration,
    /// Images larger than this are dropped from the prompt
    pub max_image_bytes: usize,
}

impl From<&ServerConfig> for EstimationSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_items: config.nutrition_lookup.max_items,
            lookup_timeout: config.nutrition_lookup.item_timeout(),
            max_image_bytes: config.limits.max_image_bytes,
        }
    }
}

/// One estimation request as submitted by the caller
#[derive(Debug, Clone, Default)]
pub struct EstimationRequest {
    /// Free-text description (may be empty)
    pub description: String,
    /// Optional meal photo, not yet checked against the size ceiling
    pub image: Option<ImageInput>,
    /// Dosing parameters with defaults already applied
    pub params: DoseParams,
}

/// Successful estimation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResponse {
    /// Fused, rounded macros with confidence
    pub macros: FusedMacros,
    /// Bolus suggestion
    pub dose: DoseResult,
    /// Non-fatal advisories
    pub warnings: Vec<String>,
}

/// Advisories derived from the model's own assessment of the inputs
#[must_use]
pub fn parse_warnings(parse: &MealParseResult) -> Vec<String> {
    let mut out = Vec::new();
    if !parse.is_food_image {
        out.push(warnings::NOT_FOOD_IMAGE.to_owned());
    }
    if parse.match_score < warnings::LOW_MATCH_SCORE_THRESHOLD {
        out.push(warnings::LOW_MATCH_SCORE.to_owned());
    }
    out
}

/// Orchestrates a single meal estimation
#[derive(Clone)]
pub struct MealEstimationService {
    inferer: Arc<dyn StructuredInferer>,
    lookup: Arc<dyn NutritionLookup>,
    settings: EstimationSettings,
}

impl MealEstimationService {
    /// Create a service over the given capabilities
    #[must_use]
    pub fn new(
        inferer: Arc<dyn StructuredInferer>,
        lookup: Arc<dyn NutritionLookup>,
        settings: EstimationSettings,
    ) -> Self {
        Self {
            inferer,
            lookup,
            settings,
        }
    }

    /// Drop an image that exceeds the size ceiling
    fn admit_image(&self, image: Option<ImageInput>) -> Option<ImageInput> {
        image.filter(|image| {
            let fits = image.data.len() <= self.settings.max_image_bytes;
            if !fits {
                info!(
                    bytes = image.data.len(),
                    limit = self.settings.max_image_bytes,
                    "Dropping oversized image, parsing from text only"
                );
            }
            fits
        })
    }

    /// Run the full pipeline for one request
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for dose parameters outside their domain, and
    /// the fatal inference errors from the meal parse.
    pub async fn estimate(&self, request: EstimationRequest) -> AppResult<EstimationResponse> {
        let request_id = format!("req_{}", Uuid::new_v4().simple());
        self.estimate_with_request_id(request, &request_id).await
    }

    /// Run the full pipeline under a caller-supplied request id
    ///
    /// # Errors
    ///
    /// Same as [`MealEstimationService::estimate`].
    #[instrument(skip_all, fields(request_id = %request_id))]
    pub async fn estimate_with_request_id(
        &self,
        request: EstimationRequest,
        request_id: &str,
    ) -> AppResult<EstimationResponse> {
        let mut tracker = StageTracker::new();

        if let Err(e) = request.params.validate() {
            tracker.advance(PipelineStage::Failed);
            return Err(e);
        }

        tracker.advance(PipelineStage::Parsing);
        let prompt = MealPrompt {
            description: request.description,
            image: self.admit_image(request.image),
        };
        let parse = match self.inferer.parse_meal(&prompt).await {
            Ok(parse) => parse,
            Err(e) => {
                tracker.advance(PipelineStage::Failed);
                warn!(error = %e, "Meal parse failed");
                return Err(e);
            }
        };
        let warnings = parse_warnings(&parse);

        tracker.advance(PipelineStage::Ranking);
        let ranked = rank_items(&parse.items, self.settings.max_items);

        tracker.advance(PipelineStage::LookupFanout);
        let lookups =
            fan_out_lookups(self.lookup.as_ref(), &ranked, self.settings.lookup_timeout).await;

        tracker.advance(PipelineStage::Fusing);
        let fusion = fuse(&parse, &lookups);

        tracker.advance(PipelineStage::Dosing);
        let carbs_g = fusion.profile.carbs_g;
        let check_units = self.inferer.check_dose(carbs_g, &request.params).await;
        if check_units.is_none() {
            debug!("Dose check unavailable, using deterministic dose");
        }
        let dose = recommend(carbs_g, &request.params, check_units);

        tracker.advance(PipelineStage::Responding);
        info!(
            items = parse.items.len(),
            looked_up = lookups.attempted,
            hits = lookups.hits,
            confidence = fusion.macros.confidence,
            units = dose.units,
            "Meal estimation complete"
        );

        Ok(EstimationResponse {
            macros: fusion.macros,
            dose,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use PipelineStage::{
            Dosing, Failed, Fusing, LookupFanout, Parsing, Ranking, Received, Responding,
        };
        let path = [Received, Parsing, Ranking, LookupFanout, Fusing, Dosing, Responding];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(Parsing.can_advance_to(Failed));
        assert!(!LookupFanout.can_advance_to(Failed));
        assert!(!Responding.can_advance_to(Failed));
    }
}
