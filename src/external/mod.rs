// ABOUTME: External API client modules (Open Food Facts)
// ABOUTME: Provides the nutrition lookup capability and its production and mock implementations

// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! External API Clients
//!
//! This module contains clients for external APIs used by the pharmora server.

pub mod nutrition_lookup;
pub mod openfoodfacts_client;

// Re-export commonly used types
pub use nutrition_lookup::{LookupFailure, MockNutritionLookup, NutritionLookup};
pub use openfoodfacts_client::{OpenFoodFactsClient, OpenFoodFactsConfig};
