// ABOUTME: Core types and constants for the Pharmora meal estimation service
// ABOUTME: Foundation crate with error handling, meal/dose models, and pipeline tunables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pharmora Core
//!
//! Foundation crate providing shared types and constants for the Pharmora meal
//! estimation service. It performs no I/O, so it changes infrequently and keeps
//! incremental compilation of the server crate cheap.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Meal parse results, macro profiles, dose parameters and results
//! - **constants**: Pipeline tunables, defaults and user-facing strings

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Meal and dose data models
pub mod models;
