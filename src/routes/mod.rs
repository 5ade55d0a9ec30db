// ABOUTME: Route module organization for the Pharmora HTTP endpoints
// ABOUTME: Health probes and the meal estimation endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the service layer.

/// Health check and system status routes
pub mod health;
/// Meal macro estimation and bolus suggestion routes
pub mod meal;

/// Health check route handlers
pub use health::HealthRoutes;
/// Meal estimation route handlers
pub use meal::{MealForm, MealRoutes};
