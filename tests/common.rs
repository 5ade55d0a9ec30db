// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging setup, scripted inference, sample meal parses and test resources
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `pharmora_server`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use pharmora_server::{
    config::environment::ServerConfig,
    errors::{AppError, AppResult, ErrorCode},
    external::NutritionLookup,
    llm::{MealPrompt, StructuredInferer},
    models::{DoseParams, MacroProfile, MealItem, MealParseResult, Quantity},
    resources::ServerResources,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Meal item with a nominal one-serving quantity
pub fn item(name: &str, est_grams: f64, conf_image: f64, conf_text: f64) -> MealItem {
    MealItem {
        name: name.to_owned(),
        qty: Quantity {
            amount: 1.0,
            unit: "serving".to_owned(),
        },
        est_grams,
        conf_image,
        conf_text,
    }
}

/// Macro profile from its five fields
pub const fn profile(carbs: f64, protein: f64, fat: f64, fiber: f64, kcal: f64) -> MacroProfile {
    MacroProfile {
        carbs_g: carbs,
        protein_g: protein,
        fat_g: fat,
        fiber_g: fiber,
        calories_kcal: kcal,
    }
}

/// A food photo parse with the given items, model macros and match score
pub fn meal_parse(items: Vec<MealItem>, macros_llm: MacroProfile, match_score: f64) -> MealParseResult {
    MealParseResult {
        is_food_image: true,
        match_score,
        items,
        macros_llm,
        notes: None,
    }
}

/// Rice and chicken plate: 80 g carbs by the model, match score 0.8
pub fn rice_and_chicken() -> MealParseResult {
    meal_parse(
        vec![
            item("white rice", 200.0, 0.9, 0.9),
            item("chicken breast", 150.0, 0.8, 0.7),
        ],
        profile(80.0, 50.0, 10.0, 2.0, 620.0),
        0.8,
    )
}

/// Dose parameters of the reference scenario (BG 180, IOB 1)
pub fn scenario_params() -> DoseParams {
    DoseParams {
        icr: 10.0,
        isf: 50.0,
        target: 110.0,
        bg: Some(180.0),
        iob: 1.0,
        tdd: 40.0,
    }
}

/// Scripted outcome of the meal parse
#[derive(Debug, Clone)]
pub enum ParseScript {
    /// Return this parse
    Parsed(MealParseResult),
    /// Fail with this code
    Fails(ErrorCode),
}

/// What the inferer saw on each parse call
#[derive(Debug, Clone, PartialEq)]
pub struct SeenPrompt {
    /// Description sent to the model
    pub description: String,
    /// Size of the attached image, if any
    pub image_bytes: Option<usize>,
}

/// `StructuredInferer` that replays scripted answers and records its inputs
#[derive(Debug, Clone)]
pub struct ScriptedInferer {
    parse: ParseScript,
    check: Option<f64>,
    prompts: Arc<Mutex<Vec<SeenPrompt>>>,
    checks: Arc<Mutex<Vec<f64>>>,
}

impl ScriptedInferer {
    /// Inferer that returns `parse` and has no dose check available
    pub fn parsed(parse: MealParseResult) -> Self {
        Self {
            parse: ParseScript::Parsed(parse),
            check: None,
            prompts: Arc::default(),
            checks: Arc::default(),
        }
    }

    /// Inferer whose meal parse fails with `code`
    pub fn failing(code: ErrorCode) -> Self {
        Self {
            parse: ParseScript::Fails(code),
            check: None,
            prompts: Arc::default(),
            checks: Arc::default(),
        }
    }

    /// Set the dose-check answer
    #[must_use]
    pub const fn with_check(mut self, units: f64) -> Self {
        self.check = Some(units);
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<SeenPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    /// Carb values the dose check was asked about
    pub fn checks(&self) -> Vec<f64> {
        self.checks.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredInferer for ScriptedInferer {
    async fn parse_meal(&self, prompt: &MealPrompt) -> AppResult<MealParseResult> {
        self.prompts.lock().unwrap().push(SeenPrompt {
            description: prompt.description.clone(),
            image_bytes: prompt.image.as_ref().map(|image| image.data.len()),
        });
        match &self.parse {
            ParseScript::Parsed(parse) => Ok(parse.clone()),
            ParseScript::Fails(code) => Err(AppError::new(*code, "scripted parse failure")),
        }
    }

    async fn check_dose(&self, carbs_g: f64, _params: &DoseParams) -> Option<f64> {
        self.checks.lock().unwrap().push(carbs_g);
        self.check
    }
}

/// Configuration with a dummy API key and defaults everywhere else
pub fn test_config() -> ServerConfig {
    test_config_with(&[])
}

/// Configuration with a dummy API key plus the given overrides
pub fn test_config_with(overrides: &[(&str, &str)]) -> ServerConfig {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("GEMINI_API_KEY".to_owned(), "test-key".to_owned());
    for (key, value) in overrides {
        vars.insert((*key).to_owned(), (*value).to_owned());
    }
    ServerConfig::from_vars(|key| vars.get(key).cloned()).unwrap()
}

/// Server resources over the given test doubles
pub fn test_resources(
    config: ServerConfig,
    inferer: Arc<dyn StructuredInferer>,
    lookup: Arc<dyn NutritionLookup>,
) -> Arc<ServerResources> {
    init_test_logging();
    Arc::new(ServerResources::with_services(
        Arc::new(config),
        inferer,
        lookup,
    ))
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_router(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
