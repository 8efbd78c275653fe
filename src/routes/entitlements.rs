// ABOUTME: Route handler for granting course product entitlements to users
// ABOUTME: Admin stand-in for the commerce platform's purchase-completion hook
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Entitlement management routes
//!
//! Entitlements record that a user owns a product. The access gate consults
//! them when a viewer opens a lesson of a paid course. Granting is an admin
//! action standing in for the store's purchase-completion hook.

use crate::{
    auth::AuthResult,
    database::entitlements::EntitlementsManager,
    errors::AppError,
    logging::AppLogger,
    middleware::admin_guard::require_course_manager,
    resources::ServerResources,
    security::{cookies::get_cookie_value, tokens::actions},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::courses::{SuccessResponse, ACTION_TOKEN_HEADER};

/// Request body for granting an entitlement
#[derive(Debug, Deserialize)]
pub struct GrantEntitlementBody {
    /// User receiving the entitlement
    pub user_id: String,
    /// Product being granted
    pub product_id: String,
}

/// Entitlements routes handler
pub struct EntitlementsRoutes;

impl EntitlementsRoutes {
    /// Create the entitlements routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/entitlements", post(Self::handle_grant))
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

    /// Handle POST /api/entitlements - Grant a product entitlement to a user
    async fn handle_grant(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<GrantEntitlementBody>,
    ) -> Result<Response, AppError> {
        let auth = Self::authenticate(&headers, &resources).await?;
        require_course_manager(auth.user_id, &resources.database).await?;

        let token = headers
            .get(ACTION_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::auth_invalid("Missing action token"))?;
        resources
            .action_tokens
            .validate_token(token, auth.user_id, actions::GRANT_ENTITLEMENT)
            .await?;

        let user_id = Uuid::parse_str(&body.user_id)
            .map_err(|_| AppError::invalid_input(format!("Invalid user ID: {}", body.user_id)))?;
        let product_id = Uuid::parse_str(&body.product_id).map_err(|_| {
            AppError::invalid_input(format!("Invalid product ID: {}", body.product_id))
        })?;

        let manager = EntitlementsManager::new(resources.database.pool().clone());
        let entitlement = manager.grant(user_id, product_id).await?;

        AppLogger::log_content_event(
            &auth.user_id.to_string(),
            "grant",
            "entitlement",
            &entitlement.id.to_string(),
        );

        Ok((StatusCode::CREATED, Json(SuccessResponse { success: true })).into_response())
    }
}
