// ABOUTME: Unified error handling with error codes mapped to HTTP statuses
// ABOUTME: Defines AppError, ErrorCode, and the `{ "error": ... }` wire body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every failure that can reach a caller is an [`AppError`] carrying an
//! [`ErrorCode`]. The code decides the HTTP status; the message is what the
//! caller sees in the `{ "error": "..." }` body.
//!
//! Only the primary meal parse can produce the fatal inference codes
//! (`InferenceTimeout`, `InferenceMalformed`, `NoStructuredDataFound`).
//! Lookup failures and the secondary dose check never become an `AppError`:
//! they are absorbed at their own boundary and show up as lower confidence.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Request field could not be parsed or is out of its domain
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,

    // Inference (4500-4599)
    /// The inference call did not complete before its deadline
    #[serde(rename = "INFERENCE_TIMEOUT")]
    InferenceTimeout = 4500,
    /// The inference reply did not satisfy the output schema
    #[serde(rename = "INFERENCE_MALFORMED")]
    InferenceMalformed = 4501,
    /// No JSON object could be recovered from the inference reply
    #[serde(rename = "NO_STRUCTURED_DATA_FOUND")]
    NoStructuredDataFound = 4502,

    // External Services (5000-5999)
    /// An upstream service answered with an error
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// An upstream service rejected the call for quota reasons
    #[serde(rename = "EXTERNAL_RATE_LIMITED")]
    ExternalRateLimited = 5003,

    // Configuration (6000-6999)
    /// Configuration could not be loaded
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Required configuration is missing
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request: the pipeline reports every fatal parse failure as a client-visible 4xx
            Self::InvalidInput
            | Self::InferenceTimeout
            | Self::InferenceMalformed
            | Self::NoStructuredDataFound => 400,

            // 502 Bad Gateway
            Self::ExternalServiceError => 502,

            // 503 Service Unavailable
            Self::ExternalRateLimited => 503,

            // 500 Internal Server Error
            Self::ConfigError | Self::ConfigMissing | Self::InternalError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InferenceTimeout => "The meal analysis service did not respond in time",
            Self::InferenceMalformed => "The meal analysis service returned an unusable answer",
            Self::NoStructuredDataFound => "The meal analysis service returned no structured data",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalRateLimited => "External service rate limit exceeded",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigMissing => "Required configuration is missing",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the service
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Inference deadline expired
    #[must_use]
    pub fn inference_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InferenceTimeout, message)
    }

    /// Inference reply failed schema validation
    #[must_use]
    pub fn inference_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InferenceMalformed, message)
    }

    /// No JSON object could be recovered from inference output
    #[must_use]
    pub fn no_structured_data(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoStructuredDataFound, message)
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Required configuration missing
    #[must_use]
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }

    /// External service error
    #[must_use]
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error body: `{ "error": "<message>" }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Message shown to the caller
    pub error: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            error: error.message.clone(),
        }
    }
}

#[cfg(feature = "http-response")]
mod http_response {
    use super::{AppError, ErrorResponse};
    use axum::response::{IntoResponse, Response};
    use axum::Json;
    use http::StatusCode;

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ErrorResponse::from(&self))).into_response()
        }
    }
}
