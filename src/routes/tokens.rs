// ABOUTME: Route handler issuing per-action anti-forgery tokens for the admin UI
// ABOUTME: Returns one token per known mutating action, bound to the requesting user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Action token issuance route
//!
//! The admin UI fetches one token per mutating action after login and sends
//! it back in the `x-action-token` header. Tokens are user-bound, scoped to a
//! single action name, and reusable until expiry.

use crate::{
    auth::AuthResult,
    errors::AppError,
    middleware::admin_guard::require_course_manager,
    resources::ServerResources,
    security::cookies::get_cookie_value,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Response carrying one token per mutating action
#[derive(Debug, Serialize)]
pub struct ActionTokensResponse {
    /// Action name to token map
    pub tokens: HashMap<String, String>,
}

/// Action token routes handler
pub struct TokenRoutes;

impl TokenRoutes {
    /// Create the action token routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/action-tokens", get(Self::handle_issue_tokens))
            .with_state(resources)
    }

    /// Extract and authenticate user from authorization header or cookie
    async fn authenticate(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<AuthResult, AppError> {
        // Try Authorization header first, then fall back to auth_token cookie
        let auth_value =
            if let Some(auth_header) = headers.get("authorization").and_then(|h| h.to_str().ok()) {
                auth_header.to_owned()
            } else if let Some(token) = get_cookie_value(headers, "auth_token") {
                format!("Bearer {token}")
            } else {
                return Err(AppError::auth_required());
            };

        resources
            .auth_middleware
            .authenticate_request(Some(&auth_value))
            .await
    }

    /// Handle GET /api/action-tokens - Issue a token for every mutating action
    async fn handle_issue_tokens(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        require_course_manager(auth.user_id, &resources.database).await?;

        let tokens = resources.action_tokens.issue_all(auth.user_id).await?;

        let response = ActionTokensResponse { tokens };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
