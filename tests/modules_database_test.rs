// ABOUTME: Integration tests for the modules database module
// ABOUTME: Tests append positioning, reordering, renumbering, and lesson cascade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use lectern_server::database::courses::CoursesManager;
use lectern_server::database::lessons::LessonsManager;
use lectern_server::database::modules::ModulesManager;
use lectern_server::models::LessonType;
use uuid::Uuid;

// ============================================================================
// Create Tests
// ============================================================================

#[tokio::test]
async fn test_create_appends_at_end_of_course() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());

    let course = courses.create("Ordered", None).await.unwrap();
    let first = modules.create(course.id, "One").await.unwrap();
    let second = modules.create(course.id, "Two").await.unwrap();
    let third = modules.create(course.id, "Three").await.unwrap();

    assert_eq!(first.position, 1);
    assert_eq!(second.position, 2);
    assert_eq!(third.position, 3);
}

#[tokio::test]
async fn test_create_positions_are_per_course() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());

    let left = courses.create("Left", None).await.unwrap();
    let right = courses.create("Right", None).await.unwrap();

    modules.create(left.id, "L1").await.unwrap();
    modules.create(left.id, "L2").await.unwrap();
    let r1 = modules.create(right.id, "R1").await.unwrap();

    assert_eq!(r1.position, 1);
}

// ============================================================================
// Read Tests
// ============================================================================

#[tokio::test]
async fn test_list_for_course_ordered_by_position() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());

    let course = courses.create("Listing", None).await.unwrap();
    let a = modules.create(course.id, "A").await.unwrap();
    let b = modules.create(course.id, "B").await.unwrap();
    let c = modules.create(course.id, "C").await.unwrap();

    modules.reorder(course.id, &[c.id, a.id, b.id]).await.unwrap();

    let listed = modules.list_for_course(course.id).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);
}

#[tokio::test]
async fn test_options_for_course_pairs_id_with_title() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());

    let course = courses.create("Options", None).await.unwrap();
    let intro = modules.create(course.id, "Introduction").await.unwrap();
    modules.create(course.id, "Deep Dive").await.unwrap();

    let options = modules.options_for_course(course.id).await.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].id, intro.id);
    assert_eq!(options[0].label, "Introduction");
    assert_eq!(options[1].label, "Deep Dive");
}

#[tokio::test]
async fn test_get_unknown_module_returns_none() {
    let database = common::create_test_database().await.unwrap();
    let modules = ModulesManager::new(database.pool().clone());

    assert!(modules.get(Uuid::new_v4()).await.unwrap().is_none());
}

// ============================================================================
// Update Tests
// ============================================================================

#[tokio::test]
async fn test_update_title_preserves_position() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());

    let course = courses.create("Renames", None).await.unwrap();
    modules.create(course.id, "Filler").await.unwrap();
    let module = modules.create(course.id, "Old").await.unwrap();

    let updated = modules
        .update_title(module.id, "New")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "New");
    assert_eq!(updated.position, 2);
}

// ============================================================================
// Reorder Tests
// ============================================================================

#[tokio::test]
async fn test_reorder_assigns_dense_positions_in_list_order() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());

    let course = courses.create("Shuffle", None).await.unwrap();
    let a = modules.create(course.id, "A").await.unwrap();
    let b = modules.create(course.id, "B").await.unwrap();
    let c = modules.create(course.id, "C").await.unwrap();

    modules.reorder(course.id, &[b.id, c.id, a.id]).await.unwrap();

    assert_eq!(modules.get(b.id).await.unwrap().unwrap().position, 1);
    assert_eq!(modules.get(c.id).await.unwrap().unwrap().position, 2);
    assert_eq!(modules.get(a.id).await.unwrap().unwrap().position, 3);
}

#[tokio::test]
async fn test_reorder_ignores_modules_of_other_courses() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());

    let mine = courses.create("Mine", None).await.unwrap();
    let other = courses.create("Other", None).await.unwrap();
    let a = modules.create(mine.id, "A").await.unwrap();
    let b = modules.create(mine.id, "B").await.unwrap();
    let foreign = modules.create(other.id, "Foreign").await.unwrap();

    modules
        .reorder(mine.id, &[b.id, a.id, foreign.id])
        .await
        .unwrap();

    assert_eq!(modules.get(b.id).await.unwrap().unwrap().position, 1);
    assert_eq!(modules.get(a.id).await.unwrap().unwrap().position, 2);
    // The foreign module keeps its own course's numbering
    assert_eq!(modules.get(foreign.id).await.unwrap().unwrap().position, 1);
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn test_delete_renumbers_surviving_modules() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());

    let course = courses.create("Gaps", None).await.unwrap();
    let a = modules.create(course.id, "A").await.unwrap();
    let b = modules.create(course.id, "B").await.unwrap();
    let c = modules.create(course.id, "C").await.unwrap();

    let deleted = modules.delete(b.id, false).await.unwrap();
    assert!(deleted);

    assert_eq!(modules.get(a.id).await.unwrap().unwrap().position, 1);
    assert_eq!(modules.get(c.id).await.unwrap().unwrap().position, 2);
}

#[tokio::test]
async fn test_delete_without_flag_orphans_lessons() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());
    let lessons = LessonsManager::new(database.pool().clone());

    let course = courses.create("Keeps", None).await.unwrap();
    let module = modules.create(course.id, "Doomed").await.unwrap();
    lessons
        .create(course.id, Some(module.id), "Survivor", LessonType::Text)
        .await
        .unwrap();

    let deleted = modules.delete(module.id, false).await.unwrap();
    assert!(deleted);

    assert_eq!(lessons.count_for_course(course.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_with_flag_removes_lessons() {
    let database = common::create_test_database().await.unwrap();
    let courses = CoursesManager::new(database.pool().clone());
    let modules = ModulesManager::new(database.pool().clone());
    let lessons = LessonsManager::new(database.pool().clone());

    let course = courses.create("Purges", None).await.unwrap();
    let module = modules.create(course.id, "Doomed").await.unwrap();
    lessons
        .create(course.id, Some(module.id), "Gone", LessonType::Video)
        .await
        .unwrap();
    lessons
        .create(course.id, None, "Unmoduled stays", LessonType::Text)
        .await
        .unwrap();

    let deleted = modules.delete(module.id, true).await.unwrap();
    assert!(deleted);

    // Only the module's own lessons are removed
    assert_eq!(lessons.count_for_course(course.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_unknown_module_returns_false() {
    let database = common::create_test_database().await.unwrap();
    let modules = ModulesManager::new(database.pool().clone());

    assert!(!modules.delete(Uuid::new_v4(), false).await.unwrap());
}
