// ABOUTME: Central authorization guard for routes requiring the course-management capability
// ABOUTME: Verifies the user has the admin role and returns 403 Forbidden if not
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Course Management Guard
//!
//! Centralized capability checking for admin route handlers. Instead of each
//! handler performing inline role checks, handlers call the
//! `require_course_manager` helper.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lectern_server::auth::AuthResult;
//! use lectern_server::database::Database;
//! use lectern_server::middleware::admin_guard::require_course_manager;
//! use std::sync::Arc;
//!
//! async fn admin_handler(
//!     auth: AuthResult,
//!     database: Arc<Database>,
//! ) -> Result<String, lectern_server::errors::AppError> {
//!     let admin = require_course_manager(auth.user_id, &database).await?;
//!     Ok(format!("Welcome {}", admin.email))
//! }
//! ```

use crate::database::users::UsersManager;
use crate::database::Database;
use crate::errors::{AppError, ErrorCode};
use crate::models::User;
use std::sync::Arc;
use uuid::Uuid;

/// Require the course-management capability for a user
///
/// Verifies that the authenticated user carries the admin role. Returns the
/// User record if authorized, or 403 Forbidden if not.
///
/// # Errors
///
/// Returns an error if:
/// - The user is not found in the database
/// - The database query fails
/// - The user lacks the course-management capability (403 Forbidden)
pub async fn require_course_manager(
    user_id: Uuid,
    database: &Arc<Database>,
) -> Result<User, AppError> {
    let users = UsersManager::new(database.pool().clone());
    let user = users
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;

    if !user.role.can_manage_courses() {
        return Err(AppError::new(
            ErrorCode::PermissionDenied,
            "Course management privileges required",
        ));
    }

    Ok(user)
}
