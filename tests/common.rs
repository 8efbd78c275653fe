// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, auth, resource, and user creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `lectern_server`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use anyhow::Result;
use lectern_server::{
    auth::{generate_jwt_secret, AuthManager},
    config::environment::ServerConfig,
    database::{users::UsersManager, Database},
    models::{User, UserRole},
    resources::ServerResources,
};
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Low bcrypt cost keeps password hashing fast in tests
pub const TEST_BCRYPT_COST: u32 = 4;

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // Check for TEST_LOG environment variable to control test logging level
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN, // Default to WARN for quiet tests
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup with migrated schema
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    database.migrate().await?;
    Ok(database)
}

/// Create test authentication manager
pub fn create_test_auth_manager() -> AuthManager {
    let jwt_secret = generate_jwt_secret();
    AuthManager::new(&jwt_secret, 24)
}

/// Standard test server configuration
pub fn create_test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.content.public_url = "http://localhost:8081".to_owned();
    config
}

/// Create fully wired server resources backed by an in-memory database
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    let auth_manager = create_test_auth_manager();
    Ok(Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(create_test_config()),
    )))
}

/// Create a user with the given role and return it with a bearer token
pub async fn create_user_with_role(
    resources: &Arc<ServerResources>,
    email: &str,
    role: UserRole,
) -> Result<(User, String)> {
    let password_hash = bcrypt::hash("correct horse battery", TEST_BCRYPT_COST)?;
    let mut user = User::new(email.to_owned(), password_hash, Some("Test User".to_owned()));
    user.role = role;

    let users = UsersManager::new(resources.database.pool().clone());
    users.create(&user).await?;

    let token = resources.auth_manager.generate_token(&user)?;
    Ok((user, token))
}

/// Create an admin user and return it with a bearer token
pub async fn create_admin_user(resources: &Arc<ServerResources>) -> Result<(User, String)> {
    create_user_with_role(resources, "admin@example.com", UserRole::Admin).await
}

/// Create a member user and return it with a bearer token
pub async fn create_member_user(resources: &Arc<ServerResources>) -> Result<(User, String)> {
    create_user_with_role(resources, "member@example.com", UserRole::Member).await
}

/// Create a standard test user record directly in the database
pub async fn create_test_user(database: &Database) -> Result<(Uuid, User)> {
    let user = User::new(
        "test@example.com".to_owned(),
        "test_hash".to_owned(),
        Some("Test User".to_owned()),
    );
    let user_id = user.id;

    let users = UsersManager::new(database.pool().clone());
    users.create(&user).await?;
    Ok((user_id, user))
}
