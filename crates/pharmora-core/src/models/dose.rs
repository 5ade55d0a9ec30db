// ABOUTME: Insulin dosing inputs and the bolus recommendation returned to callers
// ABOUTME: DoseParams with documented defaults and domain validation, plus DoseResult
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::dosing;
use crate::errors::{AppError, AppResult};

/// Per-request dosing parameters, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseParams {
    /// Insulin-to-carbohydrate ratio, grams per unit (> 0)
    pub icr: f64,
    /// Insulin sensitivity factor, mg/dL per unit (> 0)
    pub isf: f64,
    /// Target blood glucose, mg/dL (> 0)
    pub target: f64,
    /// Current blood glucose, mg/dL (> 0 when present)
    pub bg: Option<f64>,
    /// Insulin on board, units (>= 0)
    pub iob: f64,
    /// Total daily dose, units (> 0)
    pub tdd: f64,
}

impl Default for DoseParams {
    fn default() -> Self {
        Self {
            icr: dosing::DEFAULT_ICR,
            isf: dosing::DEFAULT_ISF,
            target: dosing::DEFAULT_TARGET,
            bg: None,
            iob: dosing::DEFAULT_IOB,
            tdd: dosing::DEFAULT_TDD,
        }
    }
}

impl DoseParams {
    /// Largest bolus ever recommended: a fixed fraction of total daily dose
    #[must_use]
    pub fn max_bolus(&self) -> f64 {
        dosing::MAX_BOLUS_FRACTION_OF_TDD * self.tdd
    }

    /// Reject parameters outside their domain
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the offending field.
    pub fn validate(&self) -> AppResult<()> {
        require_positive("icr", self.icr)?;
        require_positive("isf", self.isf)?;
        require_positive("target", self.target)?;
        require_positive("tdd", self.tdd)?;
        if let Some(bg) = self.bg {
            require_positive("bg", bg)?;
        }
        if !(self.iob.is_finite() && self.iob >= 0.0) {
            return Err(AppError::invalid_input(format!(
                "iob must be a non-negative number, got {}",
                self.iob
            )));
        }
        Ok(())
    }
}

fn require_positive(field: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}

/// Bolus recommendation with a human-readable derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseResult {
    /// Recommended units, one decimal, never above the deterministic formula
    pub units: f64,
    /// Term-by-term explanation of the deterministic formula
    pub rationale: String,
    /// Fixed non-clinical disclaimer
    pub disclaimer: String,
}
