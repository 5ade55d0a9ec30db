// ABOUTME: Centralized resource container for dependency injection in the HTTP server
// ABOUTME: Builds the inference provider, nutrition lookup client and estimation service once
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Server Resources Module
//!
//! Shared resources are built once at startup and handed to route handlers
//! behind an `Arc`. Tests swap the external capabilities for mocks through
//! [`ServerResources::with_services`].

use std::sync::Arc;

use tracing::info;

use crate::config::ServerConfig;
use crate::external::{NutritionLookup, OpenFoodFactsClient, OpenFoodFactsConfig};
use crate::llm::{GeminiInferer, GeminiProvider, LlmProvider, StructuredInferer};
use crate::services::{EstimationSettings, MealEstimationService};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Validated server configuration
    pub config: Arc<ServerConfig>,
    /// Meal estimation pipeline
    pub estimation: MealEstimationService,
}

impl ServerResources {
    /// Create resources backed by the live Gemini and Open Food Facts clients
    #[must_use]
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let provider: Arc<dyn LlmProvider> = Arc::new(
            GeminiProvider::new(config.inference.api_key.clone())
                .with_default_model(config.inference.parse_model.clone()),
        );
        let inferer: Arc<dyn StructuredInferer> =
            Arc::new(GeminiInferer::new(provider, &config.inference));
        let lookup: Arc<dyn NutritionLookup> = Arc::new(OpenFoodFactsClient::new(
            OpenFoodFactsConfig::from(&config.nutrition_lookup),
        ));

        info!(
            parse_model = %config.inference.parse_model,
            check_model = %config.inference.check_model,
            lookup_base = %config.nutrition_lookup.base_url,
            "Server resources initialized"
        );
        Self::with_services(config, inferer, lookup)
    }

    /// Create resources over caller-provided capabilities
    #[must_use]
    pub fn with_services(
        config: Arc<ServerConfig>,
        inferer: Arc<dyn StructuredInferer>,
        lookup: Arc<dyn NutritionLookup>,
    ) -> Self {
        let settings = EstimationSettings::from(config.as_ref());
        Self {
            estimation: MealEstimationService::new(inferer, lookup, settings),
            config,
        }
    }
}
