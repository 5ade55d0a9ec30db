// ABOUTME: Main library entry point for the Pharmora meal estimation service
// ABOUTME: Estimates meal macros from a photo and text, then suggests a bounded insulin bolus
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pharmora Server
//!
//! A stateless HTTP service that turns a meal photo and/or description into a
//! macronutrient estimate and a bounded insulin bolus suggestion.
//!
//! ## Pipeline
//!
//! 1. A multimodal model parses the meal into ingredients with gram estimates
//! 2. The heaviest, best-attested ingredients are looked up in Open Food Facts
//!    concurrently, each under its own deadline
//! 3. The model's macros and the database macros are blended by coverage
//! 4. A deterministic bolus formula is computed, optionally lowered by a
//!    second model opinion but never raised
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pharmora_server::config::environment::ServerConfig;
//! use pharmora_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Pharmora server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Error types shared with `pharmora-core`
pub mod errors;

/// External nutrition database clients
pub mod external;

/// Ranking, fusion, and dosing algorithms
pub mod intelligence;

/// Generative model clients, prompts, and structured-output recovery
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Shared server resources injected into route handlers
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// HTTP server assembly
pub mod server;

/// Request orchestration services
pub mod services;

pub use pharmora_core::constants;
pub use pharmora_core::models;
