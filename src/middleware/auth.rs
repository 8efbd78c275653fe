// ABOUTME: Authentication middleware for admin and viewer requests
// ABOUTME: Handles JWT bearer tokens with an auth_token cookie fallback and user lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

use crate::auth::{AuthManager, AuthMethod, AuthResult};
use crate::database::users::UsersManager;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use std::sync::Arc;
use uuid::Uuid;

/// Middleware for request authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: AuthManager,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: AuthManager, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request using headers (supports cookies and Authorization header)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Authentication credentials are missing (no cookie or header)
    /// - JWT token validation fails
    /// - The user no longer exists or is inactive
    #[tracing::instrument(
        skip(self, headers),
        fields(
            auth_method = tracing::field::Empty,
            user_id = tracing::field::Empty,
            success = tracing::field::Empty,
        )
    )]
    pub async fn authenticate_request_with_headers(
        &self,
        headers: &axum::http::HeaderMap,
    ) -> AppResult<AuthResult> {
        // Try cookie authentication first (preferred for web clients)
        if let Some(jwt_token) = crate::security::cookies::get_cookie_value(headers, "auth_token") {
            tracing::debug!("Found JWT in httpOnly cookie, attempting authentication");
            tracing::Span::current().record("auth_method", AuthMethod::SessionCookie.display_name());
            match self.authenticate_jwt_token(&jwt_token).await {
                Ok(result) => {
                    tracing::Span::current()
                        .record("user_id", result.user_id.to_string())
                        .record("success", true);
                    return Ok(AuthResult {
                        auth_method: AuthMethod::SessionCookie,
                        ..result
                    });
                }
                Err(e) => {
                    tracing::Span::current().record("success", false);
                    tracing::warn!("JWT cookie authentication failed: {}", e);
                    return Err(e);
                }
            }
        }

        // Fall back to Authorization header for API clients
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());

        self.authenticate_request(auth_header).await
    }

    /// Authenticate a request from its Authorization header value
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The header is missing or not a Bearer token
    /// - JWT token validation fails
    /// - The user no longer exists or is inactive
    #[tracing::instrument(
        skip(self, auth_header),
        fields(
            auth_method = tracing::field::Empty,
            user_id = tracing::field::Empty,
            success = tracing::field::Empty,
        )
    )]
    pub async fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<AuthResult> {
        let Some(auth_str) = auth_header else {
            tracing::warn!("Authentication failed: missing authorization header");
            return Err(AppError::auth_required());
        };

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            tracing::Span::current().record("auth_method", AuthMethod::BearerToken.display_name());
            match self.authenticate_jwt_token(token).await {
                Ok(result) => {
                    tracing::Span::current()
                        .record("user_id", result.user_id.to_string())
                        .record("success", true);
                    Ok(result)
                }
                Err(e) => {
                    tracing::Span::current().record("success", false);
                    tracing::warn!("JWT authentication failed: {}", e);
                    Err(e)
                }
            }
        } else {
            tracing::Span::current().record("success", false);
            tracing::warn!("Authentication failed: invalid authorization header format");
            Err(AppError::auth_invalid(
                "Invalid authorization header format - must be 'Bearer <token>'",
            ))
        }
    }

    /// Validate a JWT and load the user it names
    async fn authenticate_jwt_token(&self, token: &str) -> AppResult<AuthResult> {
        let claims = self
            .auth_manager
            .validate_token_detailed(token)
            .map_err(|e| AppError::auth_invalid(format!("JWT validation failed: {e}")))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))?;

        // Token alone is not enough: the account must still exist and be active
        let users = UsersManager::new(self.database.pool().clone());
        let user = users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;

        if !user.is_active {
            return Err(AppError::auth_invalid("User account is deactivated"));
        }

        Ok(AuthResult {
            user_id,
            auth_method: AuthMethod::BearerToken,
        })
    }

    /// Get a reference to the auth manager for testing purposes
    #[must_use]
    pub const fn auth_manager(&self) -> &AuthManager {
        &self.auth_manager
    }
}
