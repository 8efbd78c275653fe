// ABOUTME: Database operations for courses
// ABOUTME: Handles course CRUD, unique slug resolution and cascade deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

use super::Database;
use crate::constants::limits::MAX_SLUG_LENGTH;
use crate::errors::{AppError, AppResult};
use crate::models::{Course, CourseStatus};
use crate::utils::text::{slugify, truncate_slug};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Slug used when a title reduces to nothing after slugification
const FALLBACK_SLUG: &str = "course";

/// Request to update a course's publication fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCourseDetailsRequest {
    /// New publication status
    pub status: CourseStatus,
    /// Start date, cleared when omitted
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Linked product, cleared when omitted
    #[serde(default)]
    pub product_id: Option<Uuid>,
}

/// Course database operations manager
pub struct CoursesManager {
    pool: SqlitePool,
}

impl CoursesManager {
    /// Create a new courses manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new draft course with a collision-free slug
    ///
    /// The slug is derived from the title unless the caller supplies one;
    /// either way it goes through the uniqueness resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(&self, title: &str, requested_slug: Option<&str>) -> AppResult<Course> {
        let mut base = requested_slug.map_or_else(|| slugify(title), slugify);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_owned();
        }
        let slug = self.resolve_unique_slug(&base, None).await?;
        let course = Course::new(title.to_owned(), slug);

        sqlx::query(
            r"
            INSERT INTO courses (
                id, title, slug, status, start_date, product_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(course.id.to_string())
        .bind(&course.title)
        .bind(&course.slug)
        .bind(course.status.as_str())
        .bind(Option::<String>::None) // start_date
        .bind(Option::<String>::None) // product_id
        .bind(course.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create course: {e}")))?;

        Ok(course)
    }

    /// Get a course by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, course_id: Uuid) -> AppResult<Option<Course>> {
        let row = sqlx::query(
            r"
            SELECT id, title, slug, status, start_date, product_id,
                   created_at, updated_at
            FROM courses
            WHERE id = $1
            ",
        )
        .bind(course_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get course: {e}")))?;

        row.map(|r| row_to_course(&r)).transpose()
    }

    /// List all courses, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self) -> AppResult<Vec<Course>> {
        let rows = sqlx::query(
            r"
            SELECT id, title, slug, status, start_date, product_id,
                   created_at, updated_at
            FROM courses
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list courses: {e}")))?;

        rows.iter().map(row_to_course).collect()
    }

    /// Rename a course
    ///
    /// Returns the updated course, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_title(&self, course_id: Uuid, title: &str) -> AppResult<Option<Course>> {
        let result = sqlx::query("UPDATE courses SET title = $1, updated_at = $2 WHERE id = $3")
            .bind(title)
            .bind(Utc::now().to_rfc3339())
            .bind(course_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update course title: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(course_id).await
    }

    /// Change a course's slug, re-resolving collisions against other courses
    ///
    /// Returns the updated course, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested slug is empty after slugification
    /// or the database operation fails
    pub async fn update_slug(
        &self,
        course_id: Uuid,
        requested_slug: &str,
    ) -> AppResult<Option<Course>> {
        let base = slugify(requested_slug);
        if base.is_empty() {
            return Err(AppError::invalid_input("Slug cannot be empty"));
        }
        let slug = self.resolve_unique_slug(&base, Some(course_id)).await?;

        let result = sqlx::query("UPDATE courses SET slug = $1, updated_at = $2 WHERE id = $3")
            .bind(&slug)
            .bind(Utc::now().to_rfc3339())
            .bind(course_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update course slug: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(course_id).await
    }

    /// Update a course's publication status, start date and linked product
    ///
    /// Returns the updated course, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_details(
        &self,
        course_id: Uuid,
        request: &UpdateCourseDetailsRequest,
    ) -> AppResult<Option<Course>> {
        let result = sqlx::query(
            r"
            UPDATE courses SET
                status = $1, start_date = $2, product_id = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(request.status.as_str())
        .bind(request.start_date.map(|d| d.to_rfc3339()))
        .bind(request.product_id.map(|p| p.to_string()))
        .bind(Utc::now().to_rfc3339())
        .bind(course_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update course details: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(course_id).await
    }

    /// Delete a course, optionally cascading to its modules and lessons
    ///
    /// Lessons go first, then modules, then the course row, all in one
    /// transaction. With both flags false the descendants stay behind,
    /// orphaned but intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(
        &self,
        course_id: Uuid,
        delete_modules: bool,
        delete_lessons: bool,
    ) -> AppResult<bool> {
        let course_id_str = course_id.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        if delete_lessons {
            sqlx::query("DELETE FROM lessons WHERE course_id = $1")
                .bind(&course_id_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete course lessons: {e}")))?;
        }

        if delete_modules {
            sqlx::query("DELETE FROM modules WHERE course_id = $1")
                .bind(&course_id_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete course modules: {e}")))?;
        }

        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(&course_id_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete course: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve a desired slug to one no other course uses
    ///
    /// Appends "-2", "-3", ... on collision, truncating the base so the
    /// combined slug never exceeds the maximum length. Bounded by the number
    /// of existing courses plus one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn resolve_unique_slug(
        &self,
        desired: &str,
        exclude_id: Option<Uuid>,
    ) -> AppResult<String> {
        let base = truncate_slug(desired, MAX_SLUG_LENGTH);
        if !self.slug_exists(&base, exclude_id).await? {
            return Ok(base);
        }

        let mut suffix: u64 = 2;
        loop {
            let suffix_str = suffix.to_string();
            let stem = truncate_slug(desired, MAX_SLUG_LENGTH - suffix_str.len() - 1);
            let candidate = format!("{stem}-{suffix_str}");
            if !self.slug_exists(&candidate, exclude_id).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    /// Check whether a slug is taken by a course other than `exclude_id`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let row = match exclude_id {
            Some(id) => {
                sqlx::query("SELECT 1 FROM courses WHERE slug = $1 AND id != $2")
                    .bind(slug)
                    .bind(id.to_string())
                    .fetch_optional(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT 1 FROM courses WHERE slug = $1")
                    .bind(slug)
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to check slug: {e}")))?;

        Ok(row.is_some())
    }
}

impl Database {
    /// Create the courses table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_courses(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS courses (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                slug TEXT UNIQUE NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published', 'scheduled')),
                start_date TEXT,
                product_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_status ON courses(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_product_id ON courses(product_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Convert a database row to a Course struct
fn row_to_course(row: &SqliteRow) -> AppResult<Course> {
    let id_str: String = row.get("id");
    let status_str: String = row.get("status");
    let start_date_str: Option<String> = row.get("start_date");
    let product_id_str: Option<String> = row.get("product_id");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(Course {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        title: row.get("title"),
        slug: row.get("slug"),
        status: status_str.parse()?,
        start_date: start_date_str
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        product_id: product_id_str
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}
