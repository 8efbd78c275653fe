// ABOUTME: User authentication route handlers for registration and login
// ABOUTME: Provides REST endpoints for account creation and JWT session issuance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Authentication routes for user registration and login

use crate::{
    constants::limits,
    database::users::UsersManager,
    errors::AppError,
    logging::AppLogger,
    models::User,
    resources::ServerResources,
    utils::text::sanitize_text,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// User registration request
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// User registration response
#[derive(Debug, serde::Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub message: String,
}

/// User login request
#[derive(Debug, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User info for login response
#[derive(Debug, serde::Serialize)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
}

/// User login response
#[derive(Debug, serde::Serialize)]
pub struct LoginResponse {
    pub jwt_token: String,
    pub expires_at: String,
    pub user: UserInfo,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .with_state(resources)
    }

    /// Validate email format
    #[must_use]
    pub fn is_valid_email(email: &str) -> bool {
        // Simple email validation
        if email.len() <= 5 {
            return false;
        }
        let Some(at_pos) = email.find('@') else {
            return false;
        };
        if at_pos == 0 || at_pos == email.len() - 1 {
            return false; // @ at start or end
        }
        let domain_part = &email[at_pos + 1..];
        domain_part.contains('.')
    }

    /// Validate password strength
    #[must_use]
    pub const fn is_valid_password(password: &str) -> bool {
        password.len() >= limits::MIN_PASSWORD_LENGTH
    }

    /// Handle POST /api/auth/register - Create a new user account
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        tracing::info!("User registration attempt for email: {}", request.email);

        if !Self::is_valid_email(&request.email) {
            return Err(AppError::invalid_input("Invalid email format"));
        }

        if !Self::is_valid_password(&request.password) {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {} characters",
                limits::MIN_PASSWORD_LENGTH
            )));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

        let display_name = request
            .display_name
            .as_deref()
            .map(sanitize_text)
            .filter(|name| !name.is_empty());
        let user = User::new(request.email.clone(), password_hash, display_name);

        let users = UsersManager::new(resources.database.pool().clone());
        let user_id = users.create(&user).await?;

        AppLogger::log_auth_event(&user_id.to_string(), "register", true, None);
        tracing::info!(
            "User registered successfully: {} ({})",
            request.email,
            user_id
        );

        let response = RegisterResponse {
            user_id: user_id.to_string(),
            message: "User registered successfully".into(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/auth/login - Authenticate a user and issue a session token
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        tracing::info!("User login attempt for email: {}", request.email);

        let users = UsersManager::new(resources.database.pool().clone());
        let user = users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        // Verify password using spawn_blocking to avoid blocking the async executor
        let password = request.password.clone();
        let password_hash = user.password_hash.clone();
        let is_valid =
            tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
                .await
                .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("Password verification error: {e}")))?;

        if !is_valid {
            AppLogger::log_auth_event(
                &user.id.to_string(),
                "login",
                false,
                Some("invalid password"),
            );
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        if !user.is_active {
            AppLogger::log_auth_event(
                &user.id.to_string(),
                "login",
                false,
                Some("account deactivated"),
            );
            return Err(AppError::auth_invalid("User account is deactivated"));
        }

        users.update_last_active(user.id).await?;

        let jwt_token = resources.auth_manager.generate_token(&user)?;
        let expires_at = chrono::Utc::now()
            + chrono::Duration::hours(resources.auth_manager.token_expiry_hours());

        AppLogger::log_auth_event(&user.id.to_string(), "login", true, None);
        tracing::info!(
            "User logged in successfully: {} ({})",
            request.email,
            user.id
        );

        let response = LoginResponse {
            jwt_token,
            expires_at: expires_at.to_rfc3339(),
            user: UserInfo {
                user_id: user.id.to_string(),
                email: user.email,
                display_name: user.display_name,
                role: user.role.as_str().to_owned(),
            },
        };
        Ok(Json(response).into_response())
    }
}
