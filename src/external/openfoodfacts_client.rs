// ABOUTME: Open Food Facts search client for per-100 g nutrition data
// ABOUTME: Free-text product search, tolerant nutriment decoding, and kJ to kcal fallback
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Open Food Facts API Client
//!
//! Searches the public Open Food Facts database by ingredient name and reads
//! the per-100 g nutriments of the best match. No API key is required.
//!
//! # API Reference
//! Search endpoint: <https://openfoodfacts.github.io/openfoodfacts-server/api/>
//!
//! # Example
//! ```rust,no_run
//! use std::time::Duration;
//! use pharmora_server::external::{NutritionLookup, OpenFoodFactsClient, OpenFoodFactsConfig};
//!
//! # async fn example() {
//! let client = OpenFoodFactsClient::new(OpenFoodFactsConfig::default());
//! let per_100g = client.per_100g("banana", Duration::from_secs(4)).await;
//! # }
//! ```

use async_trait::async_trait;
use pharmora_core::constants::nutrition_lookup::{KJ_PER_KCAL, OPENFOODFACTS_BASE_URL};
use pharmora_core::models::MacroProfile;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::instrument;

use super::nutrition_lookup::{LookupFailure, NutritionLookup};
use crate::config::NutritionLookupConfig;

/// Open Food Facts client configuration
#[derive(Debug, Clone)]
pub struct OpenFoodFactsConfig {
    /// Base URL (default: <https://world.openfoodfacts.org>)
    pub base_url: String,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: OPENFOODFACTS_BASE_URL.to_owned(),
        }
    }
}

impl From<&NutritionLookupConfig> for OpenFoodFactsConfig {
    fn from(config: &NutritionLookupConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
        }
    }
}

/// Search response envelope; only the first product is used
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    nutriments: Option<Map<String, Value>>,
}

/// Read a nutriment that may be serialized as a number or a numeric string
fn nutriment(nutriments: &Map<String, Value>, key: &str) -> Option<f64> {
    match nutriments.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn first_nutriment(nutriments: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| nutriment(nutriments, key))
}

/// Decode a per-100 g profile from an Open Food Facts `nutriments` object
///
/// # Errors
///
/// Returns `Malformed` when a present value is negative or not finite.
pub fn profile_from_nutriments(
    nutriments: &Map<String, Value>,
) -> Result<MacroProfile, LookupFailure> {
    let calories_kcal = first_nutriment(nutriments, &["energy-kcal_100g", "energy_kcal_100g"])
        .or_else(|| nutriment(nutriments, "energy_100g").map(|kj| kj / KJ_PER_KCAL))
        .unwrap_or(0.0);

    let profile = MacroProfile {
        carbs_g: first_nutriment(nutriments, &["carbohydrates_100g", "carbs_100g"]).unwrap_or(0.0),
        protein_g: nutriment(nutriments, "proteins_100g").unwrap_or(0.0),
        fat_g: nutriment(nutriments, "fat_100g").unwrap_or(0.0),
        fiber_g: nutriment(nutriments, "fiber_100g").unwrap_or(0.0),
        calories_kcal,
    };

    if profile.is_valid() {
        Ok(profile)
    } else {
        Err(LookupFailure::Malformed(
            "negative or non-finite nutriment".to_owned(),
        ))
    }
}

/// Decode the first product of a search response body
///
/// # Errors
///
/// Returns `Malformed` for an unreadable body and `Miss` when there is no
/// product or the product has no nutriments.
pub fn profile_from_search_body(body: &str) -> Result<MacroProfile, LookupFailure> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| LookupFailure::Malformed(e.to_string()))?;
    let nutriments = response
        .products
        .into_iter()
        .next()
        .and_then(|product| product.nutriments)
        .ok_or(LookupFailure::Miss)?;
    profile_from_nutriments(&nutriments)
}

/// Open Food Facts API client
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    config: OpenFoodFactsConfig,
    http_client: reqwest::Client,
}

impl OpenFoodFactsClient {
    /// Create a new Open Food Facts client
    #[must_use]
    pub fn new(config: OpenFoodFactsConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/cgi/search.pl", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NutritionLookup for OpenFoodFactsClient {
    #[instrument(skip(self))]
    async fn lookup(&self, name: &str) -> Result<MacroProfile, LookupFailure> {
        let response = self
            .http_client
            .get(self.search_url())
            .query(&[
                ("search_terms", name),
                ("search_simple", "1"),
                ("json", "1"),
                ("page_size", "1"),
            ])
            .send()
            .await
            .map_err(|e| LookupFailure::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::Unavailable(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupFailure::Unavailable(e.to_string()))?;
        profile_from_search_body(&body)
    }
}
