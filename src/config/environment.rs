// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, pipeline tunables, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment
//!
//! All settings come from environment variables; there is no config file.
//! Missing values fall back to the defaults in `pharmora_core::constants`,
//! except `GEMINI_API_KEY`, which is required. Values that are present but
//! unparsable are rejected rather than silently defaulted.

use std::env;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

use pharmora_core::constants::{inference, limits, nutrition_lookup, ports, timeouts};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, AppResult};

/// Environment variable holding the inference API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment type for logging and other deployment-dependent behavior
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Generative inference endpoint settings
#[derive(Clone)]
pub struct InferenceConfig {
    /// API key for the generative endpoint
    pub api_key: String,
    /// Model used for the meal-parse call
    pub parse_model: String,
    /// Model used for the dose sanity check
    pub check_model: String,
    /// Meal-parse deadline in milliseconds
    pub parse_timeout_ms: u64,
    /// Dose-check deadline in milliseconds
    pub check_timeout_ms: u64,
}

impl InferenceConfig {
    /// Meal-parse deadline
    #[must_use]
    pub const fn parse_timeout(&self) -> Duration {
        Duration::from_millis(self.parse_timeout_ms)
    }

    /// Dose-check deadline
    #[must_use]
    pub const fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }
}

impl Debug for InferenceConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_key", &"[REDACTED]")
            .field("parse_model", &self.parse_model)
            .field("check_model", &self.check_model)
            .field("parse_timeout_ms", &self.parse_timeout_ms)
            .field("check_timeout_ms", &self.check_timeout_ms)
            .finish()
    }
}

/// External nutrition database settings
#[derive(Debug, Clone)]
pub struct NutritionLookupConfig {
    /// Base URL of the Open Food Facts instance
    pub base_url: String,
    /// Per-ingredient deadline in milliseconds
    pub item_timeout_ms: u64,
    /// Maximum ranked ingredients looked up per request
    pub max_items: usize,
}

impl NutritionLookupConfig {
    /// Per-ingredient deadline
    #[must_use]
    pub const fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }
}

/// Request size limits
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    /// Images above this many bytes are dropped from the prompt
    pub max_image_bytes: usize,
    /// Bodies above this many bytes are refused with 413
    pub max_body_bytes: usize,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated allowed origins, or `*`
    pub allowed_origins: String,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Generative inference settings
    pub inference: InferenceConfig,
    /// Nutrition lookup settings
    pub nutrition_lookup: NutritionLookupConfig,
    /// Request size limits
    pub limits: RequestLimits,
    /// CORS settings
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when `GEMINI_API_KEY` is unset, or `ConfigError`
    /// when a value cannot be parsed or fails validation.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        let config = Self::from_vars(|key| env::var(key).ok())?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_vars<F>(var: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var(GEMINI_API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::config_missing(format!("{GEMINI_API_KEY_ENV} is not set"))
            })?;

        let config = Self {
            http_port: parse_or(&var, "HTTP_PORT", ports::DEFAULT_HTTP_PORT)?,
            host: var("HOST").unwrap_or_else(|| ports::DEFAULT_HOST.to_owned()),
            environment: Environment::from_str_or_default(
                &var("ENVIRONMENT").unwrap_or_default(),
            ),
            inference: InferenceConfig {
                api_key,
                parse_model: var("PHARMORA_PARSE_MODEL")
                    .unwrap_or_else(|| inference::DEFAULT_MODEL.to_owned()),
                check_model: var("PHARMORA_CHECK_MODEL")
                    .unwrap_or_else(|| inference::DEFAULT_MODEL.to_owned()),
                parse_timeout_ms: parse_or(
                    &var,
                    "PHARMORA_PARSE_TIMEOUT_MS",
                    timeouts::LLM_PARSE_TIMEOUT_MS,
                )?,
                check_timeout_ms: parse_or(
                    &var,
                    "PHARMORA_CHECK_TIMEOUT_MS",
                    timeouts::LLM_CHECK_TIMEOUT_MS,
                )?,
            },
            nutrition_lookup: NutritionLookupConfig {
                base_url: var("OPENFOODFACTS_BASE_URL")
                    .unwrap_or_else(|| nutrition_lookup::OPENFOODFACTS_BASE_URL.to_owned()),
                item_timeout_ms: parse_or(
                    &var,
                    "PHARMORA_LOOKUP_TIMEOUT_MS",
                    timeouts::LOOKUP_ITEM_TIMEOUT_MS,
                )?,
                max_items: parse_or(&var, "PHARMORA_LOOKUP_MAX_ITEMS", limits::LOOKUP_MAX_ITEMS)?,
            },
            limits: RequestLimits {
                max_image_bytes: parse_or(
                    &var,
                    "PHARMORA_MAX_IMAGE_BYTES",
                    limits::MAX_IMAGE_BYTES,
                )?,
                max_body_bytes: parse_or(
                    &var,
                    "PHARMORA_MAX_BODY_BYTES",
                    limits::MAX_BODY_BYTES,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_owned()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for zero deadlines, a zero lookup cap, or a zero
    /// size limit.
    pub fn validate(&self) -> AppResult<()> {
        let checks = [
            ("PHARMORA_PARSE_TIMEOUT_MS", self.inference.parse_timeout_ms == 0),
            ("PHARMORA_CHECK_TIMEOUT_MS", self.inference.check_timeout_ms == 0),
            ("PHARMORA_LOOKUP_TIMEOUT_MS", self.nutrition_lookup.item_timeout_ms == 0),
            ("PHARMORA_LOOKUP_MAX_ITEMS", self.nutrition_lookup.max_items == 0),
            ("PHARMORA_MAX_IMAGE_BYTES", self.limits.max_image_bytes == 0),
            ("PHARMORA_MAX_BODY_BYTES", self.limits.max_body_bytes == 0),
        ];
        if let Some((name, _)) = checks.iter().find(|(_, is_zero)| *is_zero) {
            return Err(AppError::config(format!("{name} must be greater than zero")));
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Pharmora Server Configuration:\n\
             - Listen: {}:{}\n\
             - Environment: {}\n\
             - Parse Model: {} (deadline {}ms)\n\
             - Check Model: {} (deadline {}ms)\n\
             - Nutrition Lookup: {} (deadline {}ms, max {} items)\n\
             - Image Ceiling: {} bytes (body limit {} bytes)\n\
             - CORS Origins: {}",
            self.host,
            self.http_port,
            self.environment,
            self.inference.parse_model,
            self.inference.parse_timeout_ms,
            self.inference.check_model,
            self.inference.check_timeout_ms,
            self.nutrition_lookup.base_url,
            self.nutrition_lookup.item_timeout_ms,
            self.nutrition_lookup.max_items,
            self.limits.max_image_bytes,
            self.limits.max_body_bytes,
            self.cors.allowed_origins,
        )
    }
}

/// Parse an optional variable, falling back to `default` when unset or blank
fn parse_or<F, T>(var: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}"))),
        _ => Ok(default),
    }
}
