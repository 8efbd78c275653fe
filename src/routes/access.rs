// ABOUTME: Route handler for member-facing lesson viewing behind the entitlement gate
// ABOUTME: Serves lesson content to entitled viewers and a fixed HTML denial view otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Lesson access gate route
//!
//! Resolves whether the authenticated viewer may read a lesson: admins always
//! may, courses without a linked product are free, and otherwise the viewer
//! needs an entitlement for the course's product. Denials render a fixed HTML
//! view instead of a JSON error.

use crate::{
    database::{
        courses::CoursesManager, entitlements::EntitlementsManager, lessons::LessonsManager,
        users::UsersManager,
    },
    errors::AppError,
    logging::AppLogger,
    models::{Course, User},
    resources::ServerResources,
    utils::html::escape_html,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use super::lessons::LessonResponse;

/// Denial page embedded at compile-time
/// Loaded with `include_str`!() to avoid blocking filesystem IO at runtime
const ACCESS_DENIED_TEMPLATE: &str = include_str!("../../templates/access_denied.html");

/// Fallback label when the owning course row is unavailable
const UNKNOWN_COURSE_LABEL: &str = "this course";

/// Lesson access routes handler
pub struct AccessRoutes;

impl AccessRoutes {
    /// Create the lesson view route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/lessons/:id/view", get(Self::handle_view_lesson))
            .with_state(resources)
    }

    /// Render the access denial page for a course
    fn render_denial(course_title: &str) -> String {
        ACCESS_DENIED_TEMPLATE.replace("{{COURSE_TITLE}}", &escape_html(course_title))
    }

    /// Decide whether a viewer may read lessons of a course
    async fn is_allowed(
        resources: &Arc<ServerResources>,
        user: &User,
        course: Option<&Course>,
    ) -> Result<bool, AppError> {
        if user.role.can_manage_courses() {
            return Ok(true);
        }

        // A course without a linked product is free; an orphaned lesson
        // whose course row is gone has no product to check either.
        let Some(product_id) = course.and_then(|c| c.product_id) else {
            return Ok(true);
        };

        let entitlements = EntitlementsManager::new(resources.database.pool().clone());
        entitlements.check(user.id, product_id).await
    }

    /// Handle GET /api/lessons/:id/view - Serve lesson content or the denial view
    async fn handle_view_lesson(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources
            .auth_middleware
            .authenticate_request_with_headers(&headers)
            .await?;
        let lesson_id = Uuid::parse_str(&id)
            .map_err(|_| AppError::invalid_input(format!("Invalid lesson ID: {id}")))?;

        let lessons = LessonsManager::new(resources.database.pool().clone());
        let lesson = lessons
            .get(lesson_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Lesson {id}")))?;

        let users = UsersManager::new(resources.database.pool().clone());
        let user = users
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", auth.user_id)))?;

        let courses = CoursesManager::new(resources.database.pool().clone());
        let course = courses.get(lesson.course_id).await?;

        if Self::is_allowed(&resources, &user, course.as_ref()).await? {
            let response: LessonResponse = lesson.into();
            return Ok((StatusCode::OK, Json(response)).into_response());
        }

        AppLogger::log_access_denied(&user.id.to_string(), &id, "no entitlement");

        let title = course
            .as_ref()
            .map_or(UNKNOWN_COURSE_LABEL, |c| c.title.as_str());
        Ok((StatusCode::FORBIDDEN, Html(Self::render_denial(title))).into_response())
    }
}
