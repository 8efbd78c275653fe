// ABOUTME: HTTP server assembly binding all route modules into a single axum application
// ABOUTME: Owns the listen loop, CORS and tracing layers, and graceful shutdown handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Course server runtime
//!
//! Merges the per-domain routers into one application, applies the CORS and
//! request tracing layers, and serves until a shutdown signal arrives.

use crate::middleware::setup_cors;
use crate::resources::ServerResources;
use crate::routes::{
    AccessRoutes, AuthRoutes, CoursesRoutes, EntitlementsRoutes, HealthRoutes, LessonsRoutes,
    ModulesRoutes, TokenRoutes,
};
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Course management server with centralized resource management
#[derive(Clone)]
pub struct LecternServer {
    resources: Arc<ServerResources>,
}

impl LecternServer {
    /// Create a new server from shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Build the full application router
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(HealthRoutes::routes())
            .merge(AuthRoutes::routes(self.resources.clone()))
            .merge(TokenRoutes::routes(self.resources.clone()))
            .merge(CoursesRoutes::routes(self.resources.clone()))
            .merge(ModulesRoutes::routes(self.resources.clone()))
            .merge(LessonsRoutes::routes(self.resources.clone()))
            .merge(AccessRoutes::routes(self.resources.clone()))
            .merge(EntitlementsRoutes::routes(self.resources.clone()))
            .layer(setup_cors(&self.resources.config))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified port
    /// or the accept loop fails.
    pub async fn run(self, port: u16) -> Result<()> {
        let app = self.router();

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("HTTP server listening on http://{addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

/// Resolve when the process receives a shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown signal handler: {e}");
        return;
    }
    info!("Shutdown signal received");
}
