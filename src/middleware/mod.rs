// ABOUTME: HTTP middleware for the estimation API
// ABOUTME: CORS policy and request correlation/logging
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// CORS configuration
pub mod cors;
/// Request id assignment and request logging
pub mod tracing;

pub use cors::setup_cors;
pub use tracing::{request_tracing, RequestContext, REQUEST_ID_HEADER};
