// ABOUTME: LLM provider abstraction layer for structured, multimodal generation
// ABOUTME: Defines the provider contract plus the meal-parse and dose-check inference capability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Service Provider Interface
//!
//! Two layers live here:
//!
//! - **`LlmProvider`**: a raw transport. It takes a [`GenerationRequest`]
//!   (prompt text, optional inline images, sampling settings) and returns the
//!   model's text.
//! - **`StructuredInferer`**: the capability the pipeline actually depends on.
//!   It owns the prompts, the deadlines, and the conversion of free text into
//!   validated structured data.
//!
//! ## Example: Using a Provider
//!
//! ```rust,no_run
//! use pharmora_server::llm::{GeminiProvider, GenerationRequest, LlmProvider};
//!
//! async fn example(provider: &GeminiProvider) {
//!     let request = GenerationRequest::new("Return {\"ok\": true}")
//!         .with_temperature(0.1)
//!         .with_json_output();
//!     let response = provider.complete(&request).await;
//! }
//! ```

mod gemini;
/// Structured inference capability with deadlines
pub mod inference;
/// Recovery of JSON objects from free-form model output
pub mod json_extract;
/// Prompt templates for the two inference call shapes
pub mod prompts;

pub use gemini::GeminiProvider;
pub use inference::{GeminiInferer, MealPrompt, StructuredInferer};
pub use json_extract::extract_json;

use async_trait::async_trait;
use bytes::Bytes;
use pharmora_core::constants::inference::JSON_MIME_TYPE;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// LLM provider capability flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LlmCapabilities: u8 {
        /// Provider accepts inline image input
        const VISION = 0b0000_0001;
        /// Provider can be asked for a JSON response MIME type
        const JSON_MODE = 0b0000_0010;
    }
}

impl LlmCapabilities {
    /// Check if vision is supported
    #[must_use]
    pub const fn supports_vision(&self) -> bool {
        self.contains(Self::VISION)
    }

    /// Check if JSON mode is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Inline image attached to a generation request
#[derive(Clone)]
pub struct ImageInput {
    /// MIME type reported by the uploader
    pub mime_type: String,
    /// Raw image bytes
    pub data: Bytes,
}

impl std::fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageInput")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A single-turn generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// User prompt text
    pub prompt: String,
    /// Inline images sent after the prompt text
    pub images: Vec<ImageInput>,
    /// Model identifier (provider-specific)
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Requested response MIME type
    pub response_mime_type: Option<String>,
}

impl GenerationRequest {
    /// Create a text-only request
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
            model: None,
            temperature: None,
            max_tokens: None,
            response_mime_type: None,
        }
    }

    /// Attach an inline image
    #[must_use]
    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.images.push(image);
        self
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a pure JSON reply
    #[must_use]
    pub fn with_json_output(mut self) -> Self {
        self.response_mime_type = Some(JSON_MIME_TYPE.to_owned());
        self
    }
}

/// Response from a generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for single-turn generation
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "gemini")
    fn name(&self) -> &'static str;

    /// Provider capabilities
    fn capabilities(&self) -> LlmCapabilities;

    /// Default model to use if not specified in request
    fn default_model(&self) -> &str;

    /// Perform a generation call
    async fn complete(&self, request: &GenerationRequest) -> Result<GenerationResponse, AppError>;
}
