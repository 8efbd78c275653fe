// ABOUTME: HTTP integration tests for module administration routes
// ABOUTME: Tests module creation, renaming, deletion with cascade, and reordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::Router;
use helpers::axum_test::AxumTestRequest;
use lectern_server::database::lessons::LessonsManager;
use lectern_server::models::LessonType;
use lectern_server::resources::ServerResources;
use lectern_server::server::LecternServer;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

async fn setup_admin() -> (Arc<ServerResources>, Router, String, HashMap<String, String>) {
    let resources = common::create_test_resources().await.unwrap();
    let app = LecternServer::new(resources.clone()).router();

    let (_admin, token) = common::create_admin_user(&resources).await.unwrap();
    let bearer = format!("Bearer {token}");

    let response = AxumTestRequest::get("/api/action-tokens")
        .header("authorization", &bearer)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    let tokens: HashMap<String, String> =
        serde_json::from_value(body["tokens"].clone()).unwrap();

    (resources, app, bearer, tokens)
}

async fn create_course(
    app: &Router,
    bearer: &str,
    tokens: &HashMap<String, String>,
    title: &str,
) -> String {
    let response = AxumTestRequest::post("/api/courses")
        .header("authorization", bearer)
        .header("x-action-token", &tokens["add_course"])
        .json(&json!({"title": title}))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json();
    body["id"].as_str().unwrap().to_owned()
}

async fn create_module(
    app: &Router,
    bearer: &str,
    tokens: &HashMap<String, String>,
    course_id: &str,
    title: &str,
) -> serde_json::Value {
    let response = AxumTestRequest::post("/api/modules")
        .header("authorization", bearer)
        .header("x-action-token", &tokens["add_module"])
        .json(&json!({"course_id": course_id, "title": title}))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
    response.json()
}

// ============================================================================
// Create Tests
// ============================================================================

#[tokio::test]
async fn test_create_module_appends_position() {
    let (_resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;

    let first = create_module(&app, &bearer, &tokens, &course_id, "Week 1").await;
    let second = create_module(&app, &bearer, &tokens, &course_id, "Week 2").await;

    assert_eq!(first["position"], 1);
    assert_eq!(second["position"], 2);
    assert_eq!(first["course_id"], course_id);
    assert_eq!(first["title"], "Week 1");
}

#[tokio::test]
async fn test_create_module_requires_action_token() {
    let (_resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;

    let response = AxumTestRequest::post("/api/modules")
        .header("authorization", &bearer)
        .json(&json!({"course_id": course_id, "title": "No Token"}))
        .send(app)
        .await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_create_module_rejects_blank_title() {
    let (_resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;

    let response = AxumTestRequest::post("/api/modules")
        .header("authorization", &bearer)
        .header("x-action-token", &tokens["add_module"])
        .json(&json!({"course_id": course_id, "title": "   "}))
        .send(app)
        .await;

    assert_eq!(response.status(), 400);
}

// ============================================================================
// Rename Tests
// ============================================================================

#[tokio::test]
async fn test_rename_module() {
    let (_resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;
    let module = create_module(&app, &bearer, &tokens, &course_id, "Old").await;
    let module_id = module["id"].as_str().unwrap();

    let response = AxumTestRequest::put(&format!("/api/modules/{module_id}/title"))
        .header("authorization", &bearer)
        .header("x-action-token", &tokens["rename_module"])
        .json(&json!({"title": "New"}))
        .send(app)
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "New");
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_rename_unknown_module_returns_404() {
    let (_resources, app, bearer, tokens) = setup_admin().await;

    let response = AxumTestRequest::put(&format!(
        "/api/modules/{}/title",
        uuid::Uuid::new_v4()
    ))
    .header("authorization", &bearer)
    .header("x-action-token", &tokens["rename_module"])
    .json(&json!({"title": "Ghost"}))
    .send(app)
    .await;

    assert_eq!(response.status(), 404);
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn test_delete_module_keeps_lessons_by_default() {
    let (resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;
    let module = create_module(&app, &bearer, &tokens, &course_id, "Doomed").await;
    let module_id = module["id"].as_str().unwrap();

    let course_uuid = uuid::Uuid::parse_str(&course_id).unwrap();
    let module_uuid = uuid::Uuid::parse_str(module_id).unwrap();
    let lessons = LessonsManager::new(resources.database.pool().clone());
    lessons
        .create(course_uuid, Some(module_uuid), "Kept", LessonType::Text)
        .await
        .unwrap();

    let response = AxumTestRequest::delete(&format!("/api/modules/{module_id}"))
        .header("authorization", &bearer)
        .header("x-action-token", &tokens["delete_module"])
        .send(app)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(lessons.count_for_course(course_uuid).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_module_cascades_when_flagged() {
    let (resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;
    let module = create_module(&app, &bearer, &tokens, &course_id, "Doomed").await;
    let module_id = module["id"].as_str().unwrap();

    let course_uuid = uuid::Uuid::parse_str(&course_id).unwrap();
    let module_uuid = uuid::Uuid::parse_str(module_id).unwrap();
    let lessons = LessonsManager::new(resources.database.pool().clone());
    lessons
        .create(course_uuid, Some(module_uuid), "Gone", LessonType::Text)
        .await
        .unwrap();

    let response = AxumTestRequest::delete(&format!(
        "/api/modules/{module_id}?delete_lessons=true"
    ))
    .header("authorization", &bearer)
    .header("x-action-token", &tokens["delete_module"])
    .send(app)
    .await;

    assert_eq!(response.status(), 200);
    assert_eq!(lessons.count_for_course(course_uuid).await.unwrap(), 0);
}

// ============================================================================
// Reorder Tests
// ============================================================================

#[tokio::test]
async fn test_reorder_modules() {
    let (_resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;

    let a = create_module(&app, &bearer, &tokens, &course_id, "A").await;
    let b = create_module(&app, &bearer, &tokens, &course_id, "B").await;

    let response = AxumTestRequest::put("/api/modules/order")
        .header("authorization", &bearer)
        .header("x-action-token", &tokens["reorder_modules"])
        .json(&json!({
            "course_id": course_id,
            "module_ids": [b["id"], a["id"]]
        }))
        .send(app.clone())
        .await;

    assert_eq!(response.status(), 200);

    let listing = AxumTestRequest::get(&format!("/api/courses/{course_id}/modules"))
        .header("authorization", &bearer)
        .send(app)
        .await;
    let body: serde_json::Value = listing.json();
    assert_eq!(body["modules"][0]["title"], "B");
    assert_eq!(body["modules"][1]["title"], "A");
}

#[tokio::test]
async fn test_reorder_rejects_malformed_module_id() {
    let (_resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;

    let response = AxumTestRequest::put("/api/modules/order")
        .header("authorization", &bearer)
        .header("x-action-token", &tokens["reorder_modules"])
        .json(&json!({
            "course_id": course_id,
            "module_ids": ["garbage"]
        }))
        .send(app)
        .await;

    assert_eq!(response.status(), 400);
}

// ============================================================================
// Module Lesson Listing Tests
// ============================================================================

#[tokio::test]
async fn test_list_module_lessons() {
    let (resources, app, bearer, tokens) = setup_admin().await;
    let course_id = create_course(&app, &bearer, &tokens, "Parent").await;
    let module = create_module(&app, &bearer, &tokens, &course_id, "Filled").await;
    let module_id = module["id"].as_str().unwrap();

    let course_uuid = uuid::Uuid::parse_str(&course_id).unwrap();
    let module_uuid = uuid::Uuid::parse_str(module_id).unwrap();
    let lessons = LessonsManager::new(resources.database.pool().clone());
    lessons
        .create(course_uuid, Some(module_uuid), "First", LessonType::Text)
        .await
        .unwrap();
    lessons
        .create(course_uuid, Some(module_uuid), "Second", LessonType::Video)
        .await
        .unwrap();

    let response = AxumTestRequest::get(&format!("/api/modules/{module_id}/lessons"))
        .header("authorization", &bearer)
        .send(app)
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    let listed = body["lessons"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["title"], "First");
    assert_eq!(listed[1]["lesson_type"], "video");
}
