// ABOUTME: HTTP integration tests for the lesson access gate
// ABOUTME: Tests entitlement checks, free courses, the denial view, and the grant endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use helpers::axum_test::AxumTestRequest;
use lectern_server::database::courses::{CoursesManager, UpdateCourseDetailsRequest};
use lectern_server::database::entitlements::EntitlementsManager;
use lectern_server::database::lessons::LessonsManager;
use lectern_server::models::{CourseStatus, LessonType};
use lectern_server::server::LecternServer;
use serde_json::json;
use uuid::Uuid;

struct GateFixture {
    app: axum::Router,
    resources: std::sync::Arc<lectern_server::resources::ServerResources>,
    course_id: Uuid,
    lesson_id: Uuid,
    product_id: Uuid,
}

/// Build a published course with a linked product and one lesson
async fn paid_course_fixture() -> GateFixture {
    let resources = common::create_test_resources().await.unwrap();
    let app = LecternServer::new(resources.clone()).router();

    let courses = CoursesManager::new(resources.database.pool().clone());
    let lessons = LessonsManager::new(resources.database.pool().clone());

    let course = courses.create("Knife Skills & <Safety>", None).await.unwrap();
    let product_id = Uuid::new_v4();
    courses
        .update_details(
            course.id,
            &UpdateCourseDetailsRequest {
                status: CourseStatus::Published,
                start_date: None,
                product_id: Some(product_id),
            },
        )
        .await
        .unwrap();

    let lesson = lessons
        .create(course.id, None, "Grip Basics", LessonType::Video)
        .await
        .unwrap();

    GateFixture {
        app,
        resources,
        course_id: course.id,
        lesson_id: lesson.id,
        product_id,
    }
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_view_requires_authentication() {
    let fixture = paid_course_fixture().await;

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", fixture.lesson_id))
        .send(fixture.app)
        .await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_view_unknown_lesson_returns_404() {
    let fixture = paid_course_fixture().await;
    let (_member, token) = common::create_member_user(&fixture.resources).await.unwrap();

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", Uuid::new_v4()))
        .header("authorization", &format!("Bearer {token}"))
        .send(fixture.app)
        .await;

    assert_eq!(response.status(), 404);
}

// ============================================================================
// Entitlement Gate Tests
// ============================================================================

#[tokio::test]
async fn test_admin_bypasses_entitlement_check() {
    let fixture = paid_course_fixture().await;
    let (_admin, token) = common::create_admin_user(&fixture.resources).await.unwrap();

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", fixture.lesson_id))
        .header("authorization", &format!("Bearer {token}"))
        .send(fixture.app)
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Grip Basics");
    assert_eq!(body["lesson_type"], "video");
}

#[tokio::test]
async fn test_unentitled_member_gets_denial_view() {
    let fixture = paid_course_fixture().await;
    let (_member, token) = common::create_member_user(&fixture.resources).await.unwrap();

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", fixture.lesson_id))
        .header("authorization", &format!("Bearer {token}"))
        .send(fixture.app)
        .await;

    assert_eq!(response.status(), 403);
    assert!(response
        .content_type()
        .is_some_and(|ct| ct.starts_with("text/html")));
    let html = response.text();
    // The course title is escaped into the page
    assert!(html.contains("Knife Skills &amp; &lt;Safety&gt;"));
    assert!(!html.contains("<Safety>"));
}

#[tokio::test]
async fn test_entitled_member_gets_lesson_content() {
    let fixture = paid_course_fixture().await;
    let (member, token) = common::create_member_user(&fixture.resources).await.unwrap();

    let entitlements = EntitlementsManager::new(fixture.resources.database.pool().clone());
    entitlements
        .grant(member.id, fixture.product_id)
        .await
        .unwrap();

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", fixture.lesson_id))
        .header("authorization", &format!("Bearer {token}"))
        .send(fixture.app)
        .await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], fixture.lesson_id.to_string());
}

#[tokio::test]
async fn test_course_without_product_is_free() {
    let resources = common::create_test_resources().await.unwrap();
    let app = LecternServer::new(resources.clone()).router();

    let courses = CoursesManager::new(resources.database.pool().clone());
    let lessons = LessonsManager::new(resources.database.pool().clone());
    let course = courses.create("Open Course", None).await.unwrap();
    let lesson = lessons
        .create(course.id, None, "Freebie", LessonType::Text)
        .await
        .unwrap();

    let (_member, token) = common::create_member_user(&resources).await.unwrap();

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", lesson.id))
        .header("authorization", &format!("Bearer {token}"))
        .send(app)
        .await;

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_orphaned_lesson_is_viewable() {
    let fixture = paid_course_fixture().await;
    let (_member, token) = common::create_member_user(&fixture.resources).await.unwrap();

    // Remove the course without cascading, leaving the lesson behind
    let courses = CoursesManager::new(fixture.resources.database.pool().clone());
    courses.delete(fixture.course_id, false, false).await.unwrap();

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", fixture.lesson_id))
        .header("authorization", &format!("Bearer {token}"))
        .send(fixture.app)
        .await;

    // With no course row there is no product to gate on
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_view_accepts_cookie_authentication() {
    let fixture = paid_course_fixture().await;
    let (_admin, token) = common::create_admin_user(&fixture.resources).await.unwrap();

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", fixture.lesson_id))
        .header("cookie", &format!("auth_token={token}"))
        .send(fixture.app)
        .await;

    assert_eq!(response.status(), 200);
}

// ============================================================================
// POST /api/entitlements Tests
// ============================================================================

#[tokio::test]
async fn test_grant_endpoint_unlocks_lesson() {
    let fixture = paid_course_fixture().await;
    let (_admin, admin_token) = common::create_admin_user(&fixture.resources).await.unwrap();
    let (member, member_token) = common::create_member_user(&fixture.resources).await.unwrap();
    let admin_bearer = format!("Bearer {admin_token}");

    let tokens_response = AxumTestRequest::get("/api/action-tokens")
        .header("authorization", &admin_bearer)
        .send(fixture.app.clone())
        .await;
    let tokens_body: serde_json::Value = tokens_response.json();
    let grant_token = tokens_body["tokens"]["grant_entitlement"].as_str().unwrap();

    let grant = AxumTestRequest::post("/api/entitlements")
        .header("authorization", &admin_bearer)
        .header("x-action-token", grant_token)
        .json(&json!({
            "user_id": member.id,
            "product_id": fixture.product_id
        }))
        .send(fixture.app.clone())
        .await;
    assert_eq!(grant.status(), 201);

    let response = AxumTestRequest::get(&format!("/api/lessons/{}/view", fixture.lesson_id))
        .header("authorization", &format!("Bearer {member_token}"))
        .send(fixture.app)
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_grant_endpoint_requires_action_token() {
    let fixture = paid_course_fixture().await;
    let (_admin, admin_token) = common::create_admin_user(&fixture.resources).await.unwrap();

    let response = AxumTestRequest::post("/api/entitlements")
        .header("authorization", &format!("Bearer {admin_token}"))
        .json(&json!({
            "user_id": Uuid::new_v4(),
            "product_id": Uuid::new_v4()
        }))
        .send(fixture.app)
        .await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_grant_endpoint_rejects_members() {
    let fixture = paid_course_fixture().await;
    let (_member, member_token) = common::create_member_user(&fixture.resources).await.unwrap();

    let response = AxumTestRequest::post("/api/entitlements")
        .header("authorization", &format!("Bearer {member_token}"))
        .json(&json!({
            "user_id": Uuid::new_v4(),
            "product_id": Uuid::new_v4()
        }))
        .send(fixture.app)
        .await;

    assert_eq!(response.status(), 403);
}
