// ABOUTME: Route handlers for the module management REST API
// ABOUTME: Provides admin endpoints for creating, renaming, deleting, and reordering modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Module management routes
//!
//! Modules group lessons inside a course and carry a dense 1-based position.
//! All endpoints require JWT authentication plus course management privileges,
//! and every mutation additionally requires a matching action token.

use crate::{
    auth::AuthResult,
    database::{lessons::LessonsManager, modules::ModulesManager},
    errors::AppError,
    logging::AppLogger,
    middleware::admin_guard::require_course_manager,
    models::Module,
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

use super::courses::{ListLessonsResponse, SuccessResponse, ACTION_TOKEN_HEADER};

/// Response for a module
#[derive(Debug, Serialize)]
pub struct ModuleResponse {
    /// Unique identifier
    pub id: String,
    /// Owning course
    pub course_id: String,
    /// Module title
    pub title: String,
    /// 1-based position within the course
    pub position: i64,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<Module> for ModuleResponse {
    fn from(module: Module) -> Self {
        Self {
            id: module.id.to_string(),
            course_id: module.course_id.to_string(),
            title: module.title,
            position: module.position,
            created_at: module.created_at.to_rfc3339(),
            updated_at: module.updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating a module
#[derive(Debug, Deserialize)]
pub struct CreateModuleBody {
    /// Owning course
    pub course_id: String,
    /// Module title
    pub title: String,
}

/// Request body for renaming a module
#[derive(Debug, Deserialize)]
pub struct UpdateModuleTitleBody {
    /// New module title
    pub title: String,
}

/// Response after renaming a module
#[derive(Debug, Serialize)]
pub struct ModuleTitleUpdatedResponse {
    /// Stored title after sanitization
    pub title: String,
    /// Whether the update was applied
    pub success: bool,
}

/// Query parameters for deleting a module
#[derive(Debug, Deserialize)]
pub struct DeleteModuleQuery {
    /// Also delete the module's lessons
    #[serde(default)]
    pub delete_lessons: bool,
}

/// Request body for reordering the modules of a course
#[derive(Debug, Deserialize)]
pub struct ReorderModulesBody {
    /// Course whose modules are being reordered
    pub course_id: String,
    /// Module ids in their new order
    pub module_ids: Vec<String>,
}

/// Modules routes handler
pub struct ModulesRoutes;

impl ModulesRoutes {
    /// Create all modules routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/modules", post(Self::handle_create))
            .route("/api/modules/order", put(Self::handle_reorder))
            .route("/api/modules/:id", delete(Self::handle_delete))
            .route("/api/modules/:id/title", put(Self::handle_update_title))
            .route("/api/modules/:id/lessons", get(Self::handle_list_lessons))
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

    /// Get modules manager from the `SQLite` pool
    fn get_modules_manager(resources: &Arc<ServerResources>) -> ModulesManager {
        ModulesManager::new(resources.database.pool().clone())
    }

    /// Parse a module ID path parameter
    fn parse_module_id(id: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(id).map_err(|_| AppError::invalid_input(format!("Invalid module ID: {id}")))
    }

    /// Handle POST /api/modules - Create a module at the end of its course
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateModuleBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::ADD_MODULE).await?;

        let course_id = Uuid::parse_str(&body.course_id)
            .map_err(|_| AppError::invalid_input(format!("Invalid course ID: {}", body.course_id)))?;
        let title = sanitize_text(&body.title);
        if title.is_empty() {
            return Err(AppError::invalid_input("Module title cannot be empty"));
        }

        let manager = Self::get_modules_manager(&resources);
        let module = manager.create(course_id, &title).await?;

        AppLogger::log_content_event(
            &user_id.to_string(),
            "create",
            "module",
            &module.id.to_string(),
        );

        let response: ModuleResponse = module.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle PUT /api/modules/:id/title - Rename a module
    async fn handle_update_title(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<UpdateModuleTitleBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::RENAME_MODULE).await?;
        let module_id = Self::parse_module_id(&id)?;

        let title = sanitize_text(&body.title);
        if title.is_empty() {
            return Err(AppError::invalid_input("Module title cannot be empty"));
        }

        let manager = Self::get_modules_manager(&resources);
        let module = manager
            .update_title(module_id, &title)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Module {id}")))?;

        AppLogger::log_content_event(&user_id.to_string(), "rename", "module", &id);

        let response = ModuleTitleUpdatedResponse {
            title: module.title,
            success: true,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/modules/:id - Delete a module, optionally with its lessons
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Query(query): Query<DeleteModuleQuery>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::DELETE_MODULE).await?;
        let module_id = Self::parse_module_id(&id)?;

        let manager = Self::get_modules_manager(&resources);
        let deleted = manager.delete(module_id, query.delete_lessons).await?;
        if !deleted {
            return Err(AppError::not_found(format!("Module {id}")));
        }

        AppLogger::log_content_event(&user_id.to_string(), "delete", "module", &id);

        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }

    /// Handle PUT /api/modules/order - Apply a new module ordering for a course
    async fn handle_reorder(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ReorderModulesBody>,
    ) -> Result<Response, AppError> {
        let user_id = Self::authorize_manager(&headers, &resources).await?;
        Self::validate_action_token(&headers, &resources, user_id, actions::REORDER_MODULES)
            .await?;

        let course_id = Uuid::parse_str(&body.course_id)
            .map_err(|_| AppError::invalid_input(format!("Invalid course ID: {}", body.course_id)))?;
        let mut module_ids = Vec::with_capacity(body.module_ids.len());
        for module_id in &body.module_ids {
            let parsed = Uuid::parse_str(module_id)
                .map_err(|_| AppError::invalid_input(format!("Invalid module ID: {module_id}")))?;
            module_ids.push(parsed);
        }

        let manager = Self::get_modules_manager(&resources);
        manager.reorder(course_id, &module_ids).await?;

        AppLogger::log_content_event(
            &user_id.to_string(),
            "reorder",
            "module",
            &course_id.to_string(),
        );

        Ok((StatusCode::OK, Json(SuccessResponse { success: true })).into_response())
    }

    /// Handle GET /api/modules/:id/lessons - List the lessons of a module
    async fn handle_list_lessons(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::authorize_manager(&headers, &resources).await?;
        let module_id = Self::parse_module_id(&id)?;

        let manager = LessonsManager::new(resources.database.pool().clone());
        let lessons = manager.list_for_module(module_id).await?;

        let response = ListLessonsResponse {
            lessons: lessons.into_iter().map(Into::into).collect(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_response_from_model() {
        let course_id = Uuid::new_v4();
        let module = Module::new(course_id, "Getting Started".to_owned(), 3);
        let response: ModuleResponse = module.clone().into();

        assert_eq!(response.id, module.id.to_string());
        assert_eq!(response.course_id, course_id.to_string());
        assert_eq!(response.title, "Getting Started");
        assert_eq!(response.position, 3);
        assert_eq!(response.created_at, module.created_at.to_rfc3339());
    }

    #[test]
    fn test_parse_module_id_rejects_garbage() {
        assert!(ModulesRoutes::parse_module_id("nope").is_err());
    }
}
