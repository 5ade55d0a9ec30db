// ABOUTME: Nutrition lookup capability with per-call deadlines and failure normalization
// ABOUTME: Defines the NutritionLookup trait, the LookupFailure taxonomy, and an in-memory mock
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Nutrition Lookup
//!
//! Implementors only provide [`NutritionLookup::lookup`], which may fail in
//! any way it likes. The provided [`NutritionLookup::per_100g`] wraps it with
//! a deadline and turns every failure, including an all-zero record, into
//! `None`. Nothing on this path ever becomes an `AppError`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pharmora_core::models::MacroProfile;
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::logging::AppLogger;

/// Why a lookup contributed nothing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupFailure {
    /// The per-item deadline expired
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    /// The service answered with something that could not be read
    #[error("unreadable nutrition record: {0}")]
    Malformed(String),
    /// No product matched, or the match carried no macro data
    #[error("no usable nutrition record")]
    Miss,
    /// Network failure or non-success HTTP status
    #[error("nutrition service unavailable: {0}")]
    Unavailable(String),
}

/// Per-100 g macro source keyed by free-text ingredient name
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    /// Fetch the per-100 g profile for `name` without any deadline
    ///
    /// # Errors
    ///
    /// Returns the [`LookupFailure`] that explains the missing data.
    async fn lookup(&self, name: &str) -> Result<MacroProfile, LookupFailure>;

    /// Per-100 g profile under `deadline`, or `None` for any failure
    ///
    /// A record whose carbs, protein, fat and fiber are all zero is treated as
    /// a placeholder and reported as a miss.
    async fn per_100g(&self, name: &str, deadline: Duration) -> Option<MacroProfile> {
        let outcome = match timeout(deadline, self.lookup(name)).await {
            Err(_) => Err(LookupFailure::Timeout(deadline)),
            Ok(Ok(profile)) if profile.core_fields_all_zero() => Err(LookupFailure::Miss),
            Ok(result) => result,
        };

        match outcome {
            Ok(profile) => {
                debug!(item = %name, "Nutrition lookup hit");
                Some(profile)
            }
            Err(failure) => {
                AppLogger::log_lookup_miss(name, &failure.to_string());
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
enum MockEntry {
    Found(MacroProfile),
    Delayed(Duration, MacroProfile),
    Failing(LookupFailure),
}

/// In-memory lookup for tests (no network calls)
///
/// Names are matched case-insensitively; unknown names are misses. Every
/// queried name is recorded so tests can assert which items were looked up.
#[derive(Debug, Clone, Default)]
pub struct MockNutritionLookup {
    entries: HashMap<String, MockEntry>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockNutritionLookup {
    /// Create an empty mock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock preloaded with a few common staples
    #[must_use]
    pub fn with_staples() -> Self {
        Self::new()
            .with_food(
                "white rice",
                MacroProfile {
                    carbs_g: 28.2,
                    protein_g: 2.7,
                    fat_g: 0.3,
                    fiber_g: 0.4,
                    calories_kcal: 130.0,
                },
            )
            .with_food(
                "chicken breast",
                MacroProfile {
                    carbs_g: 0.0,
                    protein_g: 31.0,
                    fat_g: 3.6,
                    fiber_g: 0.0,
                    calories_kcal: 165.0,
                },
            )
            .with_food(
                "apple",
                MacroProfile {
                    carbs_g: 13.8,
                    protein_g: 0.3,
                    fat_g: 0.2,
                    fiber_g: 2.4,
                    calories_kcal: 52.0,
                },
            )
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Answer `name` with `profile`
    #[must_use]
    pub fn with_food(mut self, name: &str, profile: MacroProfile) -> Self {
        self.entries
            .insert(Self::key(name), MockEntry::Found(profile));
        self
    }

    /// Answer `name` with `profile` after `delay`
    #[must_use]
    pub fn with_delayed_food(mut self, name: &str, delay: Duration, profile: MacroProfile) -> Self {
        self.entries
            .insert(Self::key(name), MockEntry::Delayed(delay, profile));
        self
    }

    /// Fail every lookup of `name` with `failure`
    #[must_use]
    pub fn with_failure(mut self, name: &str, failure: LookupFailure) -> Self {
        self.entries
            .insert(Self::key(name), MockEntry::Failing(failure));
        self
    }

    /// Names queried so far, in call order
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NutritionLookup for MockNutritionLookup {
    async fn lookup(&self, name: &str) -> Result<MacroProfile, LookupFailure> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name.to_owned());
        }

        match self.entries.get(&Self::key(name)) {
            Some(MockEntry::Found(profile)) => Ok(*profile),
            Some(MockEntry::Delayed(delay, profile)) => {
                sleep(*delay).await;
                Ok(*profile)
            }
            Some(MockEntry::Failing(failure)) => Err(failure.clone()),
            None => Err(LookupFailure::Miss),
        }
    }
}
