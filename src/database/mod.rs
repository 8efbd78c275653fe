// ABOUTME: Database management for course content and user storage
// ABOUTME: Connection pooling, schema migration, and per-domain manager access
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Lectern Project

//! # Database Management
//!
//! This module provides database functionality for the course content
//! service. A single [`Database`] handle owns the `SQLite` pool and runs
//! schema migrations; per-domain managers borrow pool clones for CRUD.

/// Course CRUD and slug resolution
pub mod courses;
/// Entitlement grants and checks
pub mod entitlements;
/// Lesson CRUD and sibling ordering
pub mod lessons;
/// Module CRUD and ordering
pub mod modules;
/// Application settings flags
pub mod settings;
/// User storage operations
pub mod users;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for course content storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migrations fail
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };

        // Run migrations
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        // User tables
        self.migrate_users().await?;

        // Course hierarchy tables
        self.migrate_courses().await?;
        self.migrate_modules().await?;
        self.migrate_lessons().await?;

        // Entitlement tables
        self.migrate_entitlements().await?;

        // Application settings
        self.migrate_settings().await?;

        Ok(())
    }
}
