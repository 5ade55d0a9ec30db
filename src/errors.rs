// ABOUTME: Error handling facade for the server crate
// ABOUTME: Re-exports the unified AppError system defined in pharmora-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The error types live in `pharmora-core` so the models can validate
//! themselves; this module keeps the `crate::errors` path stable for the
//! rest of the server.

pub use pharmora_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
