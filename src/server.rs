// ABOUTME: HTTP server assembly with routing, middleware layers and graceful shutdown
// ABOUTME: Merges health and meal routes, applies CORS, request tracing and body limits
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! HTTP server
//!
//! Layers, outermost first: HTTP trace span, CORS, request id and access
//! log, request body ceiling. The ceiling is the image limit plus multipart
//! overhead; images that fit the body but exceed the image limit are dropped
//! by the pipeline instead of rejected.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::middleware::{request_tracing, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{HealthRoutes, MealRoutes};

/// Pharmora HTTP server
pub struct PharmoraServer {
    resources: Arc<ServerResources>,
}

impl PharmoraServer {
    /// Create a server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the complete router with all middleware layers
    #[must_use]
    pub fn router(&self) -> Router {
        let config = &self.resources.config;
        Router::new()
            .merge(HealthRoutes::routes())
            .merge(MealRoutes::routes(Arc::clone(&self.resources)))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(axum::middleware::from_fn(request_tracing))
            .layer(setup_cors(&config.cors))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, the port cannot be bound,
    /// or the server loop fails.
    pub async fn run(self) -> AppResult<()> {
        let config = &self.resources.config;
        let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
            .parse()
            .map_err(|e| {
                AppError::config(format!(
                    "Invalid bind address {}:{}",
                    config.host, config.http_port
                ))
                .with_source(e)
            })?;

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            AppError::internal(format!("Failed to bind {addr}")).with_source(e)
        })?;
        info!(%addr, "HTTP server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::internal("HTTP server terminated").with_source(e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
