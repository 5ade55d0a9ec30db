// ABOUTME: Configuration management module for centralized server settings and parameters
// ABOUTME: Re-exports the environment-driven ServerConfig and its sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the Pharmora server

/// Environment and server configuration
pub mod environment;

pub use environment::{
    CorsConfig, Environment, InferenceConfig, NutritionLookupConfig, RequestLimits, ServerConfig,
};
