// ABOUTME: Integration tests for the application settings store
// ABOUTME: Tests key/value persistence and the demo content marker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

// ============================================================================
// Key/Value Tests
// ============================================================================

#[tokio::test]
async fn test_get_missing_setting_returns_none() {
    let database = common::create_test_database().await.unwrap();

    let setting = database.get_app_setting("nonexistent").await.unwrap();
    assert!(setting.is_none());
}

#[tokio::test]
async fn test_set_and_get_setting() {
    let database = common::create_test_database().await.unwrap();

    database.set_app_setting("theme", "dark").await.unwrap();

    let setting = database.get_app_setting("theme").await.unwrap().unwrap();
    assert_eq!(setting.key, "theme");
    assert_eq!(setting.value, "dark");
}

#[tokio::test]
async fn test_set_overwrites_existing_value() {
    let database = common::create_test_database().await.unwrap();

    database.set_app_setting("theme", "dark").await.unwrap();
    database.set_app_setting("theme", "light").await.unwrap();

    let setting = database.get_app_setting("theme").await.unwrap().unwrap();
    assert_eq!(setting.value, "light");
}

// ============================================================================
// Demo Content Marker Tests
// ============================================================================

#[tokio::test]
async fn test_demo_content_marker_defaults_to_false() {
    let database = common::create_test_database().await.unwrap();

    assert!(!database.is_demo_content_created().await.unwrap());
}

#[tokio::test]
async fn test_demo_content_marker_sticks_once_set() {
    let database = common::create_test_database().await.unwrap();

    database.mark_demo_content_created().await.unwrap();
    assert!(database.is_demo_content_created().await.unwrap());

    // Marking again is harmless
    database.mark_demo_content_created().await.unwrap();
    assert!(database.is_demo_content_created().await.unwrap());
}
