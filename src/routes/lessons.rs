// ABOUTME: Route handlers for the lesson management REST API
// ABOUTME: Provides admin endpoints for creating, deleting, and reordering lessons
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Lesson management routes
//!
//! Lessons are the leaf content units of a course, either grouped under a
//! module or attached directly to the course. All endpoints require JWT
//! authentication plus course management privileges, and every mutation
//! additionally requires a matching action token.

use crate::{
    auth::AuthResult,
    database::lessons::LessonsManager,
    errors::AppError,
    logging::AppLogger,
    middleware::admin_guard::require_course_manager,
    models::{Lesson, LessonType},
    resources::ServerResources,
    security::{cookies::get_cookie_value, tokens::actions},
    utils::text::sanitize_text,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::courses::{SuccessResponse, ACTION_TOKEN_HEADER};

/// Response for a lesson
#[derive(Debug, Serialize)]
pub struct LessonResponse {
    /// Unique identifier
    pub id: String,
    /// Owning course
    pub course_id: String,
    /// Owning module, absent for unmoduled lessons
    pub module_id: Option<String>,
    /// Lesson title
    pub title: String,
    /// Lesson content body
    pub content: String,
    /// Content type tag
    pub lesson_type: String,
    /// 1-based position within its sibling group
    pub position: i64,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<Lesson> for LessonResponse {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id.to_string(),
            course_id: lesson.course_id.to_string(),
            module_id: lesson.module_id.map(|m| m.to_string()),
            title: lesson.title,
            content: lesson.content,
            lesson_type: lesson.lesson_type.as_str().to_owned(),
            position: lesson.position,
            created_at: lesson.created_at.to_rfc3339(),
            updated_at: lesson.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating a lesson
#[derive(Debug, Deserialize)]
pub struct CreateLessonBody {
    /// Owning course
    pub course_id: String,
    /// Owning module, omitted for an unmoduled lesson
    #[serde(default)]
    pub module_id: Option<String>,
    /// Lesson title
    pub title: String,
    /// Content type tag, defaults to text
    #[serde(default)]
    pub lesson_type: Option<LessonType>,
}

/// Request body for reordering lessons within a sibling group
#[derive(Debug, Deserialize)]
pub struct ReorderLessonsBody {
    /// Lesson ids in their new order
    pub lesson_ids: Vec<String>,
}

/// Lessons routes handler
pub struct LessonsRoutes;

impl LessonsRoutes {
    /// Create all lessons routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/lessons", post(Self::handle_create))
            .route("/api/lessons/order", put(Self::handle_reorder))
            .route("/api/lessons/:id", delete(Self::handle_delete))
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

    /// Authenticate and require course management privileges
    async fn authorize_manager(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<Uuid, AppError> {
        let auth = Self::authenticate(headers, resources).await?;
        require_course_manager(auth.user_id, &resources.database).await?;
        Ok(auth.user_id)
    }

    /// Validate the action token attached to a mutating request
    async fn validate_action_token(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
        user_id: Uuid,
        action: &str,
    ) -> Result<(), AppError> {
        let token = headers
            .get(ACTION_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::auth_invalid("Missing action token"))?;

        resources
            .action_tokens
            .validate_token(token, user_id, action)
            .await
    }

    /// Get lessons manager from the `SQLite` pool
    fn get_lessons_manager(resources: &Arc<ServerResources>) -> LessonsManager {
        LessonsManager::new(resources.database.pool().clone())
    }

    /// Handle POST /api/lessons - Create a lesson at the end of its sibling group
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateLessonBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::ADD_LESSON).await?;

        let course_id = Uuid::parse_str(&body.course_id)
            .map_err(|_| AppError::invalid_input(format!("Invalid course ID: {}", body.course_id)))?;
        let module_id = match body.module_id.as_deref() {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::invalid_input(format!("Invalid module ID: {raw}")))?,
            ),
            None => None,
        };
        let title = sanitize_text(&body.title);
        if title.is_empty() {
            return Err(AppError::invalid_input("Lesson title cannot be empty"));
        }

        let manager = Self::get_lessons_manager(&resources);
        let lesson = manager
            .create(
                course_id,
                module_id,
                &title,
                body.lesson_type.unwrap_or_default(),
            )
            .await?;

        AppLogger::log_content_event(
            &user_id.to_string(),
            "create",
            "lesson",
            &lesson.id.to_string(),
        );

        let response: LessonResponse = lesson.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle DELETE /api/lessons/:id - Delete a lesson and renumber its group
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::DELETE_LESSON).await?;
        let lesson_id = Uuid::parse_str(&id)
            .map_err(|_| AppError::invalid_input(format!("Invalid lesson ID: {id}")))?;

        let manager = Self::get_lessons_manager(&resources);
        let deleted = manager.delete(lesson_id).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Lesson {id}")));
        }

        AppLogger::log_content_event(&user_id.to_string(), "delete", "lesson", &id);

        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }

    /// Handle PUT /api/lessons/order - Apply a new lesson ordering
    async fn handle_reorder(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ReorderLessonsBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::REORDER_LESSONS)
            .await?;

        let mut lesson_ids = Vec::with_capacity(body.lesson_ids.len());
        for lesson_id in &body.lesson_ids {
            let parsed = Uuid::parse_str(lesson_id)
                .map_err(|_| AppError::invalid_input(format!("Invalid lesson ID: {lesson_id}")))?;
            lesson_ids.push(parsed);
        }

        let manager = Self::get_lessons_manager(&resources);
        manager.reorder(&lesson_ids).await?;

        AppLogger::log_content_event(&user_id.to_string(), "reorder", "lesson", "batch");

        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }
}
