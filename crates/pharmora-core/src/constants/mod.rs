// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pipeline deadlines, caps, dosing defaults, and user-facing strings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! flat list. Values that operators may tune are only the defaults here; the
//! effective values come from `ServerConfig` in the server crate.

/// Service identity
pub mod service_names {
    /// Service name used in logs and health responses
    pub const PHARMORA_SERVER: &str = "pharmora-server";
}

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// Readiness endpoint
    pub const READINESS: &str = "/ready";
    /// Meal estimation endpoint
    pub const MACRO_ESTIMATE: &str = "/api/macro";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
    /// Default bind host
    pub const DEFAULT_HOST: &str = "127.0.0.1";
}

/// Deadlines for the blocking calls of the pipeline
pub mod timeouts {
    /// Meal-parse inference deadline (ms)
    pub const LLM_PARSE_TIMEOUT_MS: u64 = 12_000;
    /// Dose sanity-check inference deadline (ms)
    pub const LLM_CHECK_TIMEOUT_MS: u64 = 6_000;
    /// Per-ingredient nutrition lookup deadline (ms)
    pub const LOOKUP_ITEM_TIMEOUT_MS: u64 = 4_000;
}

/// Size and fan-out limits
pub mod limits {
    /// Maximum number of ranked ingredients looked up per request
    pub const LOOKUP_MAX_ITEMS: usize = 4;
    /// Images above this size are dropped from the prompt (4 MiB)
    pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;
    /// Abuse guard for the whole request body (32 MiB), well above any phone photo
    pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;
}

/// Generative model settings
pub mod inference {
    /// Default model for both call shapes
    pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
    /// Meal-parse sampling temperature
    pub const PARSE_TEMPERATURE: f32 = 0.2;
    /// Meal-parse output token budget
    pub const PARSE_MAX_OUTPUT_TOKENS: u32 = 600;
    /// Dose-check sampling temperature
    pub const CHECK_TEMPERATURE: f32 = 0.1;
    /// Dose-check output token budget
    pub const CHECK_MAX_OUTPUT_TOKENS: u32 = 200;
    /// MIME type requested for structured replies
    pub const JSON_MIME_TYPE: &str = "application/json";
    /// Fallback MIME type for uploaded images without a content type
    pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";
}

/// Dosing parameter defaults applied when a form field is absent
pub mod dosing {
    /// Insulin-to-carb ratio (g/U)
    pub const DEFAULT_ICR: f64 = 10.0;
    /// Insulin sensitivity factor (mg/dL per U)
    pub const DEFAULT_ISF: f64 = 50.0;
    /// Target blood glucose (mg/dL)
    pub const DEFAULT_TARGET: f64 = 110.0;
    /// Insulin on board (U)
    pub const DEFAULT_IOB: f64 = 0.0;
    /// Total daily dose (U)
    pub const DEFAULT_TDD: f64 = 40.0;
    /// Fraction of TDD that caps a single bolus
    pub const MAX_BOLUS_FRACTION_OF_TDD: f64 = 0.2;
    /// Fixed non-clinical disclaimer attached to every dose
    pub const DISCLAIMER: &str = "This suggestion is based on your ICR/ISF and estimated carbs. \
        It is not medical advice. Confirm with your clinician.";
}

/// Advisory thresholds and messages
pub mod warnings {
    /// Match scores below this produce a mismatch warning
    pub const LOW_MATCH_SCORE_THRESHOLD: f64 = 0.6;
    /// Warning when the model judges the photo not to be food
    pub const NOT_FOOD_IMAGE: &str = "The uploaded image does not look like food.";
    /// Warning when photo and description disagree
    pub const LOW_MATCH_SCORE: &str = "Image and description do not match closely; please check.";
}

/// External nutrition database
pub mod nutrition_lookup {
    /// Open Food Facts base URL
    pub const OPENFOODFACTS_BASE_URL: &str = "https://world.openfoodfacts.org";
    /// kJ per kcal, used when only `energy_100g` is reported
    pub const KJ_PER_KCAL: f64 = 4.184;
}
