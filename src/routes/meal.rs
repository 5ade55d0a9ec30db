// ABOUTME: Meal estimation route handler decoding the multipart form into a pipeline request
// ABOUTME: Applies dosing defaults, admits the optional image, and encodes the JSON result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Meal estimation routes
//!
//! `POST /api/macro` accepts `multipart/form-data` with the fields
//! `description`, `image`, `icr`, `isf`, `target`, `bg`, `iob` and `tdd`.
//! Unknown fields are ignored. Empty numeric values count as absent.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Extension, Json, Router};
use bytes::BytesMut;
use pharmora_core::constants::{endpoints, inference};
use pharmora_core::models::DoseParams;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::llm::ImageInput;
use crate::middleware::RequestContext;
use crate::resources::ServerResources;
use crate::services::{EstimationRequest, EstimationResponse};

/// Raw form values before defaults and validation
#[derive(Debug, Default)]
pub struct MealForm {
    /// Meal description text
    pub description: String,
    /// Image part, if one with content was sent
    pub image: Option<ImageInput>,
    /// Insulin-to-carb ratio
    pub icr: Option<String>,
    /// Insulin sensitivity factor
    pub isf: Option<String>,
    /// Target glucose
    pub target: Option<String>,
    /// Current glucose
    pub bg: Option<String>,
    /// Insulin on board
    pub iob: Option<String>,
    /// Total daily dose
    pub tdd: Option<String>,
}

impl MealForm {
    /// Read every part of a multipart body
    ///
    /// An image larger than `max_image_bytes` is read to the end and dropped,
    /// so the meal is still estimated from the description.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the body is not valid multipart.
    pub async fn from_multipart(
        mut multipart: Multipart,
        max_image_bytes: usize,
    ) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed_body)? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };
            match name.as_str() {
                "image" => form.image = read_image(field, max_image_bytes).await?,
                "description" => form.description = read_text(field).await?,
                "icr" => form.icr = Some(read_text(field).await?),
                "isf" => form.isf = Some(read_text(field).await?),
                "target" => form.target = Some(read_text(field).await?),
                "bg" => form.bg = Some(read_text(field).await?),
                "iob" => form.iob = Some(read_text(field).await?),
                "tdd" => form.tdd = Some(read_text(field).await?),
                _ => {}
            }
        }
        Ok(form)
    }

    /// Apply dosing defaults and parse numbers
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a value that is not a number. Domain checks
    /// (positivity and the like) run later in the pipeline.
    pub fn dose_params(&self) -> AppResult<DoseParams> {
        let defaults = DoseParams::default();
        Ok(DoseParams {
            icr: parse_number("icr", self.icr.as_deref())?.unwrap_or(defaults.icr),
            isf: parse_number("isf", self.isf.as_deref())?.unwrap_or(defaults.isf),
            target: parse_number("target", self.target.as_deref())?.unwrap_or(defaults.target),
            bg: parse_number("bg", self.bg.as_deref())?,
            iob: parse_number("iob", self.iob.as_deref())?.unwrap_or(defaults.iob),
            tdd: parse_number("tdd", self.tdd.as_deref())?.unwrap_or(defaults.tdd),
        })
    }

    /// Convert into a pipeline request
    ///
    /// # Errors
    ///
    /// Same as [`MealForm::dose_params`].
    pub fn into_request(self) -> AppResult<EstimationRequest> {
        let params = self.dose_params()?;
        Ok(EstimationRequest {
            description: self.description,
            image: self.image,
            params,
        })
    }
}

/// Parse an optional numeric form value; blank means absent
fn parse_number(field: &str, raw: Option<&str>) -> AppResult<Option<f64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<f64>().map(Some).map_err(|_| {
            AppError::invalid_input(format!("{field} must be a number, got '{value}'"))
        }),
    }
}

fn malformed_body(error: impl std::fmt::Display) -> AppError {
    AppError::invalid_input(format!("Malformed multipart body: {error}"))
}

async fn read_text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(malformed_body)
}

async fn read_image(mut field: Field<'_>, max_bytes: usize) -> AppResult<Option<ImageInput>> {
    let mime_type = field
        .content_type()
        .filter(|mime| !mime.is_empty())
        .unwrap_or(inference::DEFAULT_IMAGE_MIME_TYPE)
        .to_owned();

    let mut buffer = BytesMut::new();
    let mut received: usize = 0;
    while let Some(chunk) = field.chunk().await.map_err(malformed_body)? {
        received = received.saturating_add(chunk.len());
        if received > max_bytes {
            // Keep draining so the fields after the image still arrive
            buffer.clear();
            continue;
        }
        buffer.extend_from_slice(&chunk);
    }

    if received > max_bytes {
        info!(
            bytes = received,
            limit = max_bytes,
            "Dropping oversized image, parsing from text only"
        );
        return Ok(None);
    }
    // Browsers send an empty part when no file was picked
    if buffer.is_empty() {
        return Ok(None);
    }
    Ok(Some(ImageInput {
        mime_type,
        data: buffer.freeze(),
    }))
}

/// Meal estimation routes
pub struct MealRoutes;

impl MealRoutes {
    /// Create the meal estimation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(endpoints::MACRO_ESTIMATE, post(Self::handle_estimate))
            .with_state(resources)
    }

    async fn handle_estimate(
        State(resources): State<Arc<ServerResources>>,
        context: Option<Extension<RequestContext>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Json<EstimationResponse>, AppError> {
        let multipart = multipart.map_err(malformed_body)?;
        let request = MealForm::from_multipart(multipart, resources.config.limits.max_image_bytes)
            .await?
            .into_request()?;
        let context = context.map_or_else(RequestContext::new, |Extension(context)| context);

        let response = resources
            .estimation
            .estimate_with_request_id(request, &context.request_id)
            .await?;
        Ok(Json(response))
    }
}
