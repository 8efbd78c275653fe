// ABOUTME: Route handlers for the course management REST API
// ABOUTME: Provides admin endpoints for course CRUD, slug updates, and course content listings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Course management routes
//!
//! This module handles course endpoints for the admin surface. All endpoints
//! require JWT authentication plus course management privileges, and every
//! mutation additionally requires a matching action token.

use crate::{
    auth::AuthResult,
    config::environment::ServerConfig,
    database::{
        courses::{CoursesManager, UpdateCourseDetailsRequest},
        lessons::LessonsManager,
        modules::ModulesManager,
    },
    errors::AppError,
    logging::AppLogger,
    middleware::admin_guard::require_course_manager,
    models::{Course, ModuleOption},
    resources::ServerResources,
    security::{cookies::get_cookie_value, tokens::actions},
    utils::text::sanitize_text,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::{lessons::LessonResponse, modules::ModuleResponse};

/// Request header carrying the per-action anti-forgery token
pub const ACTION_TOKEN_HEADER: &str = "x-action-token";

/// Request body for creating a course
#[derive(Debug, Deserialize)]
pub struct CreateCourseBody {
    /// Course title
    pub title: String,
    /// Optional requested slug, derived from the title when omitted
    #[serde(default)]
    pub slug: Option<String>,
}

/// Response for a newly created course
#[derive(Debug, Serialize)]
pub struct CreatedCourseResponse {
    /// Unique identifier
    pub id: String,
    /// Course title
    pub name: String,
    /// URL slug
    pub slug: String,
    /// Admin edit page URL
    pub edit_url: String,
    /// Public course page URL
    pub view_url: String,
    /// Pre-issued token for deleting this course
    pub delete_token: String,
}

/// Response for a course with public and admin URLs
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    /// Unique identifier
    pub id: String,
    /// Course title
    pub title: String,
    /// URL slug
    pub slug: String,
    /// Publication status
    pub status: String,
    /// Scheduled start date
    pub start_date: Option<String>,
    /// Linked store product
    pub product_id: Option<String>,
    /// Admin edit page URL
    pub edit_url: String,
    /// Public course page URL
    pub view_url: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// Response for listing courses
#[derive(Debug, Serialize)]
pub struct ListCoursesResponse {
    /// Courses ordered newest first
    pub courses: Vec<CourseResponse>,
    /// Total number of courses
    pub total: u32,
}

/// Request body for renaming a course
#[derive(Debug, Deserialize)]
pub struct UpdateTitleBody {
    /// New course title
    pub title: String,
}

/// Response after renaming a course
#[derive(Debug, Serialize)]
pub struct TitleUpdatedResponse {
    /// Stored title after sanitization
    pub title: String,
    /// Whether the update was applied
    pub success: bool,
}

/// Request body for changing a course slug
#[derive(Debug, Deserialize)]
pub struct UpdateSlugBody {
    /// Requested slug
    pub slug: String,
}

/// Response after changing a course slug
#[derive(Debug, Serialize)]
pub struct SlugUpdatedResponse {
    /// Stored slug after normalization and uniqueness resolution
    pub slug: String,
    /// Whether the update was applied
    pub success: bool,
}

/// Generic success response for mutations
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Whether the operation succeeded
    pub success: bool,
}

/// Query parameters for deleting a course
#[derive(Debug, Deserialize)]
pub struct DeleteCourseQuery {
    /// Also delete the course's modules
    #[serde(default)]
    pub delete_modules: bool,
    /// Also delete the course's lessons
    #[serde(default)]
    pub delete_lessons: bool,
}

/// Response for the module dropdown options of a course
#[derive(Debug, Serialize)]
pub struct ModuleOptionsResponse {
    /// Options ordered by module position
    pub options: Vec<ModuleOptionResponse>,
}

/// A single module dropdown option
#[derive(Debug, Serialize)]
pub struct ModuleOptionResponse {
    /// Module identifier
    pub id: String,
    /// Module title
    pub label: String,
}

impl From<ModuleOption> for ModuleOptionResponse {
    fn from(option: ModuleOption) -> Self {
        Self {
            id: option.id.to_string(),
            label: option.label,
        }
    }
}

/// Response for listing the modules of a course
#[derive(Debug, Serialize)]
pub struct ListModulesResponse {
    /// Modules ordered by position
    pub modules: Vec<ModuleResponse>,
}

/// Response for listing lessons
#[derive(Debug, Serialize)]
pub struct ListLessonsResponse {
    /// Lessons ordered by position
    pub lessons: Vec<LessonResponse>,
}

/// Courses routes handler
pub struct CoursesRoutes;

impl CoursesRoutes {
    /// Create all courses routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/courses", post(Self::handle_create))
            .route("/api/courses", get(Self::handle_list))
            .route("/api/courses/:id", get(Self::handle_get))
            .route("/api/courses/:id", delete(Self::handle_delete))
            .route("/api/courses/:id/title", put(Self::handle_update_title))
            .route("/api/courses/:id/slug", put(Self::handle_update_slug))
            .route("/api/courses/:id/details", put(Self::handle_update_details))
            .route("/api/courses/:id/modules", get(Self::handle_list_modules))
            .route(
                "/api/courses/:id/module-options",
                get(Self::handle_module_options),
            )
            .route(
                "/api/courses/:id/lessons",
                get(Self::handle_list_unmoduled_lessons),
            )
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

    /// Get courses manager from the `SQLite` pool
    fn get_courses_manager(resources: &Arc<ServerResources>) -> CoursesManager {
        CoursesManager::new(resources.database.pool().clone())
    }

    /// Build the admin edit URL for a course
    fn edit_url(config: &ServerConfig, course_id: Uuid) -> String {
        format!("{}/admin/courses/{course_id}", config.content.public_url)
    }

    /// Build the public view URL for a course
    fn view_url(config: &ServerConfig, slug: &str) -> String {
        format!(
            "{}/courses/{}",
            config.content.public_url,
            urlencoding::encode(slug)
        )
    }

    /// Build a full course response including URLs
    fn build_course_response(course: Course, config: &ServerConfig) -> CourseResponse {
        CourseResponse {
            id: course.id.to_string(),
            edit_url: Self::edit_url(config, course.id),
            view_url: Self::view_url(config, &course.slug),
            title: course.title,
            slug: course.slug,
            status: course.status.as_str().to_owned(),
            start_date: course.start_date.map(|d| d.to_rfc3339()),
            product_id: course.product_id.map(|p| p.to_string()),
            created_at: course.created_at.to_rfc3339(),
            updated_at: course.updated_at.to_rfc3339(),
        }
    }

    /// Parse a course ID path parameter
    fn parse_course_id(id: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(id).map_err(|_| AppError::invalid_input(format!("Invalid course ID: {id}")))
    }

    /// Handle POST /api/courses - Create a new course
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateCourseBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::ADD_COURSE).await?;

        let title = sanitize_text(&body.title);
        if title.is_empty() {
            return Err(AppError::invalid_input("Course title cannot be empty"));
        }

        let manager = Self::get_courses_manager(&resources);
        let course = manager.create(&title, body.slug.as_deref()).await?;

        // The admin UI deletes courses from the listing it just rendered,
        // so each created row ships with its own delete token.
        let delete_token = resources
            .action_tokens
            .generate_token(user_id, actions::DELETE_COURSE)
            .await?;

        AppLogger::log_content_event(
            &user_id.to_string(),
            "create",
            "course",
            &course.id.to_string(),
        );

        let response = CreatedCourseResponse {
            id: course.id.to_string(),
            edit_url: Self::edit_url(&resources.config, course.id),
            view_url: Self::view_url(&resources.config, &course.slug),
            name: course.title,
            slug: course.slug,
            delete_token,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/courses - List all courses
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        Self::authorize_manager(&headers, &resources).await?;

        let manager = Self::get_courses_manager(&resources);
        let courses = manager.list().await?;

        let response = ListCoursesResponse {
            total: u32::try_from(courses.len()).unwrap_or(0),
            courses: courses
                .into_iter()
                .map(|c| Self::build_course_response(c, &resources.config))
                .collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/courses/:id - Get a specific course
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authorize_manager(&headers, &resources).await?;
        let course_id = Self::parse_course_id(&id)?;

        let manager = Self::get_courses_manager(&resources);
        let course = manager
            .get(course_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {id}")))?;

        let response = Self::build_course_response(course, &resources.config);
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/courses/:id/title - Rename a course
    async fn handle_update_title(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UpdateTitleBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::RENAME_COURSE).await?;
        let course_id = Self::parse_course_id(&id)?;

        let title = sanitize_text(&body.title);
        if title.is_empty() {
            return Err(AppError::invalid_input("Course title cannot be empty"));
        }

        let manager = Self::get_courses_manager(&resources);
        let course = manager
            .update_title(course_id, &title)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {id}")))?;

        AppLogger::log_content_event(&user_id.to_string(), "rename", "course", &id);

        let response = TitleUpdatedResponse {
            title: course.title,
            success: true,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/courses/:id/slug - Change a course slug
    async fn handle_update_slug(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UpdateSlugBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::UPDATE_COURSE_SLUG)
            .await?;
        let course_id = Self::parse_course_id(&id)?;

        let manager = Self::get_courses_manager(&resources);
        let course = manager
            .update_slug(course_id, &body.slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {id}")))?;

        AppLogger::log_content_event(&user_id.to_string(), "update_slug", "course", &id);

        let response = SlugUpdatedResponse {
            slug: course.slug,
            success: true,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/courses/:id/details - Update status, start date, and product link
    async fn handle_update_details(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UpdateCourseDetailsRequest>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::UPDATE_COURSE_DETAILS)
            .await?;
        let course_id = Self::parse_course_id(&id)?;

        let manager = Self::get_courses_manager(&resources);
        manager
            .update_details(course_id, &body)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {id}")))?;

        AppLogger::log_content_event(&user_id.to_string(), "update_details", "course", &id);

        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }

    /// Handle DELETE /api/courses/:id - Delete a course, optionally cascading
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(query): Query<DeleteCourseQuery>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::DELETE_COURSE).await?;
        let course_id = Self::parse_course_id(&id)?;

        let manager = Self::get_courses_manager(&resources);
        let deleted = manager
            .delete(course_id, query.delete_modules, query.delete_lessons)
            .await?;
        if !deleted {
            return Err(AppError::not_found(format!("Course {id}")));
        }

        AppLogger::log_content_event(&user_id.to_string(), "delete", "course", &id);

        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }

    /// Handle GET /api/courses/:id/modules - List the modules of a course
    async fn handle_list_modules(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authorize_manager(&headers, &resources).await?;
        let course_id = Self::parse_course_id(&id)?;

        let manager = ModulesManager::new(resources.database.pool().clone());
        let modules = manager.list_for_course(course_id).await?;

        let response = ListModulesResponse {
            modules: modules.into_iter().map(Into::into).collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/courses/:id/module-options - Module dropdown options
    async fn handle_module_options(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authorize_manager(&headers, &resources).await?;
        let course_id = Self::parse_course_id(&id)?;

        let manager = ModulesManager::new(resources.database.pool().clone());
        let options = manager.options_for_course(course_id).await?;

        let response = ModuleOptionsResponse {
            options: options.into_iter().map(Into::into).collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/courses/:id/lessons - List lessons not assigned to a module
    async fn handle_list_unmoduled_lessons(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authorize_manager(&headers, &resources).await?;
        let course_id = Self::parse_course_id(&id)?;

        let manager = LessonsManager::new(resources.database.pool().clone());
        let lessons = manager.list_unmoduled(course_id).await?;

        let response = ListLessonsResponse {
            lessons: lessons.into_iter().map(Into::into).collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseStatus;
    use chrono::Utc;

    fn test_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.content.public_url = "https://learn.example.com".to_owned();
        config
    }

    #[test]
    fn test_edit_url_uses_course_id() {
        let config = test_config();
        let id = Uuid::new_v4();
        let url = CoursesRoutes::edit_url(&config, id);
        assert_eq!(url, format!("https://learn.example.com/admin/courses/{id}"));
    }

    #[test]
    fn test_view_url_encodes_slug() {
        let config = test_config();
        let url = CoursesRoutes::view_url(&config, "caf\u{e9}-basics");
        assert_eq!(url, "https://learn.example.com/courses/caf%C3%A9-basics");
    }

    #[test]
    fn test_build_course_response_maps_fields() {
        let config = test_config();
        let mut course = Course::new("Intro".to_owned(), "intro".to_owned());
        course.status = CourseStatus::Published;
        course.start_date = Some(Utc::now());
        let response = CoursesRoutes::build_course_response(course.clone(), &config);

        assert_eq!(response.id, course.id.to_string());
        assert_eq!(response.title, "Intro");
        assert_eq!(response.status, "published");
        assert!(response.start_date.is_some());
        assert!(response.product_id.is_none());
        assert!(response.view_url.ends_with("/courses/intro"));
    }

    #[test]
    fn test_parse_course_id_rejects_garbage() {
        assert!(CoursesRoutes::parse_course_id("not-a-uuid").is_err());
    }
}
