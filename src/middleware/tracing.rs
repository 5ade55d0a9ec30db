// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Assigns request IDs, echoes them in responses, and logs method, path, status and latency
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::{HeaderName, HeaderValue};
use uuid::Uuid;

use crate::logging::AppLogger;

/// Header carrying the correlation id
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request context that flows through the request lifecycle
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id, taken from `x-request-id` or generated
    pub request_id: String,
}

impl RequestContext {
    /// Create new request context with generated request ID
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: format!("req_{}", Uuid::new_v4().simple()),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach a [`RequestContext`] to the request and log the completed exchange
pub async fn request_tracing(mut request: Request, next: Next) -> Response {
    let context = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(RequestContext::new, |value| RequestContext {
            request_id: value.to_owned(),
        });

    let method = request.method().to_string();
    let path = request.uri().path().to_owned();
    let request_id = context.request_id.clone();
    request.extensions_mut().insert(context);

    let started = Instant::now();
    let mut response = next.run(request).await;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    AppLogger::log_api_request(&method, &path, response.status().as_u16(), duration_ms);
    response
}
