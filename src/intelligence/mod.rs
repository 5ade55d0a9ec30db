// ABOUTME: Estimation algorithms for the meal pipeline
// ABOUTME: Ingredient ranking and lookup fan-out, macro fusion, and bolus calculation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Intelligence module
//!
//! Everything here except the lookup fan-out is synchronous arithmetic.

/// Deterministic bolus formula and conservative reconciliation
pub mod bolus_calculator;
/// Top-K ingredient selection and concurrent lookups
pub mod ingredient_ranking;
/// Coverage-weighted blend of model and database macros
pub mod macro_fusion;

pub use bolus_calculator::{local_dose, reconcile, recommend, LocalDose};
pub use ingredient_ranking::{fan_out_lookups, rank_items, summarize_lookups, LookupSummary};
pub use macro_fusion::{confidence, fuse, fuse_profiles, lookup_weight, FusionOutcome};
