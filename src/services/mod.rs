// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Hosts the meal estimation pipeline orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Protocol-agnostic business logic. Route handlers only decode requests and
//! encode responses.

/// Meal estimation pipeline: parse, look up, fuse, dose
pub mod meal_estimation;

pub use meal_estimation::{
    EstimationRequest, EstimationResponse, EstimationSettings, MealEstimationService,
    PipelineStage,
};
