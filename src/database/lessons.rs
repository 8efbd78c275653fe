// ABOUTME: Database operations for lessons
// ABOUTME: Handles lesson CRUD and position ordering within a module or unmoduled group
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Lesson, LessonType};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Lesson database operations manager
///
/// A lesson's sibling group is its module, or the set of unmoduled lessons
/// of its course when it has no module. Positions are dense and 1-based
/// within each group.
pub struct LessonsManager {
    pool: SqlitePool,
}

impl LessonsManager {
    /// Create a new lessons manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a new lesson to its sibling group
    ///
    /// The position is computed server-side as the current group size plus
    /// one, inside the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(
        &self,
        course_id: Uuid,
        module_id: Option<Uuid>,
        title: &str,
        lesson_type: LessonType,
    ) -> AppResult<Lesson> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let count_row = match module_id {
            Some(module_id) => {
                sqlx::query("SELECT COUNT(*) as count FROM lessons WHERE module_id = $1")
                    .bind(module_id.to_string())
                    .fetch_one(&mut *tx)
                    .await
            }
            None => sqlx::query(
                "SELECT COUNT(*) as count FROM lessons WHERE course_id = $1 AND module_id IS NULL",
            )
            .bind(course_id.to_string())
            .fetch_one(&mut *tx)
            .await,
        }
        .map_err(|e| AppError::database(format!("Failed to count lessons: {e}")))?;
        let count: i64 = count_row.get("count");

        let lesson = Lesson::new(course_id, module_id, title.to_owned(), lesson_type, count + 1);

        sqlx::query(
            r"
            INSERT INTO lessons (
                id, course_id, module_id, title, content, lesson_type,
                position, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ",
        )
        .bind(lesson.id.to_string())
        .bind(lesson.course_id.to_string())
        .bind(lesson.module_id.map(|m| m.to_string()))
        .bind(&lesson.title)
        .bind(&lesson.content)
        .bind(lesson.lesson_type.as_str())
        .bind(lesson.position)
        .bind(lesson.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create lesson: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))?;

        Ok(lesson)
    }

    /// Store lesson body content
    ///
    /// Returns the updated lesson, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_content(&self, lesson_id: Uuid, content: &str) -> AppResult<Option<Lesson>> {
        let result = sqlx::query("UPDATE lessons SET content = $1, updated_at = $2 WHERE id = $3")
            .bind(content)
            .bind(Utc::now().to_rfc3339())
            .bind(lesson_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update lesson content: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(lesson_id).await
    }

    /// Get a lesson by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, lesson_id: Uuid) -> AppResult<Option<Lesson>> {
        let row = sqlx::query(
            r"
            SELECT id, course_id, module_id, title, content, lesson_type,
                   position, created_at, updated_at
            FROM lessons
            WHERE id = $1
            ",
        )
        .bind(lesson_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get lesson: {e}")))?;

        row.map(|r| row_to_lesson(&r)).transpose()
    }

    /// List a module's lessons in position order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_for_module(&self, module_id: Uuid) -> AppResult<Vec<Lesson>> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, module_id, title, content, lesson_type,
                   position, created_at, updated_at
            FROM lessons
            WHERE module_id = $1
            ORDER BY position
            ",
        )
        .bind(module_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list lessons: {e}")))?;

        rows.iter().map(row_to_lesson).collect()
    }

    /// List a course's unmoduled lessons in position order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_unmoduled(&self, course_id: Uuid) -> AppResult<Vec<Lesson>> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, module_id, title, content, lesson_type,
                   position, created_at, updated_at
            FROM lessons
            WHERE course_id = $1 AND module_id IS NULL
            ORDER BY position
            ",
        )
        .bind(course_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list unmoduled lessons: {e}")))?;

        rows.iter().map(row_to_lesson).collect()
    }

    /// Count every lesson referencing a course, moduled or not
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn count_for_course(&self, course_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM lessons WHERE course_id = $1")
            .bind(course_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count lessons: {e}")))?;

        Ok(row.get("count"))
    }

    /// Delete a lesson and renumber its surviving siblings
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, lesson_id: Uuid) -> AppResult<bool> {
        let lesson_id_str = lesson_id.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let row = sqlx::query("SELECT course_id, module_id FROM lessons WHERE id = $1")
            .bind(&lesson_id_str)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to get lesson: {e}")))?;
        let Some(row) = row else {
            return Ok(false);
        };
        let course_id: String = row.get("course_id");
        let module_id: Option<String> = row.get("module_id");

        sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(&lesson_id_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete lesson: {e}")))?;

        renumber_lessons(&mut tx, &course_id, module_id.as_deref()).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))?;

        Ok(true)
    }

    /// Apply an explicit ordering to a set of lessons
    ///
    /// Writes position = index + 1 for each id in the given order, trusting
    /// the caller's ordering. Ids that are not lessons are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn reorder(&self, ordered_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        for (index, lesson_id) in ordered_ids.iter().enumerate() {
            let position = i64::try_from(index + 1).unwrap_or(i64::MAX);
            sqlx::query("UPDATE lessons SET position = $1 WHERE id = $2")
                .bind(position)
                .bind(lesson_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to reorder lessons: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))?;

        Ok(())
    }
}

impl Database {
    /// Create the lessons table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_lessons(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS lessons (
                id TEXT PRIMARY KEY,
                course_id TEXT NOT NULL,
                module_id TEXT,
                title TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                lesson_type TEXT NOT NULL DEFAULT 'text' CHECK (lesson_type IN ('text', 'video', 'audio', 'quiz')),
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_lessons_course_id ON lessons(course_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_lessons_module_id ON lessons(module_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Rewrite a sibling group's positions as 1..n in current position order
///
/// The group is the module's lessons when `module_id` is present, otherwise
/// the course's unmoduled lessons.
async fn renumber_lessons(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    course_id: &str,
    module_id: Option<&str>,
) -> AppResult<()> {
    let rows = match module_id {
        Some(module_id) => {
            sqlx::query("SELECT id FROM lessons WHERE module_id = $1 ORDER BY position")
                .bind(module_id)
                .fetch_all(&mut **tx)
                .await
        }
        None => sqlx::query(
            "SELECT id FROM lessons WHERE course_id = $1 AND module_id IS NULL ORDER BY position",
        )
        .bind(course_id)
        .fetch_all(&mut **tx)
        .await,
    }
    .map_err(|e| AppError::database(format!("Failed to load lessons for renumber: {e}")))?;

    for (index, row) in rows.iter().enumerate() {
        let id: String = row.get("id");
        let position = i64::try_from(index + 1).unwrap_or(i64::MAX);
        sqlx::query("UPDATE lessons SET position = $1 WHERE id = $2")
            .bind(position)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to renumber lessons: {e}")))?;
    }

    Ok(())
}

/// Convert a database row to a Lesson struct
fn row_to_lesson(row: &SqliteRow) -> AppResult<Lesson> {
    let id_str: String = row.get("id");
    let course_id_str: String = row.get("course_id");
    let module_id_str: Option<String> = row.get("module_id");
    let lesson_type_str: String = row.get("lesson_type");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(Lesson {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        course_id: Uuid::parse_str(&course_id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        module_id: module_id_str
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        title: row.get("title"),
        content: row.get("content"),
        lesson_type: lesson_type_str.parse()?,
        position: row.get("position"),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}
