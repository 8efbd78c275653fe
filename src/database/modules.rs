// ABOUTME: Database operations for course modules
// ABOUTME: Handles module CRUD plus dense 1-based position ordering within a course
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Module, ModuleOption};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Module database operations manager
pub struct ModulesManager {
    pool: SqlitePool,
}

impl ModulesManager {
    /// Create a new modules manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a new module to a course
    ///
    /// The position is computed server-side as the current module count plus
    /// one, inside the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(&self, course_id: Uuid, title: &str) -> AppResult<Module> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let row = sqlx::query("SELECT COUNT(*) as count FROM modules WHERE course_id = $1")
            .bind(course_id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to count modules: {e}")))?;
        let count: i64 = row.get("count");

        let module = Module::new(course_id, title.to_owned(), count + 1);

        sqlx::query(
            r"
            INSERT INTO modules (id, course_id, title, position, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(module.id.to_string())
        .bind(module.course_id.to_string())
        .bind(&module.title)
        .bind(module.position)
        .bind(module.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create module: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))?;

        Ok(module)
    }

    /// Get a module by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, module_id: Uuid) -> AppResult<Option<Module>> {
        let row = sqlx::query(
            r"
            SELECT id, course_id, title, position, created_at, updated_at
            FROM modules
            WHERE id = $1
            ",
        )
        .bind(module_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get module: {e}")))?;

        row.map(|r| row_to_module(&r)).transpose()
    }

    /// List a course's modules in position order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Module>> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, title, position, created_at, updated_at
            FROM modules
            WHERE course_id = $1
            ORDER BY position
            ",
        )
        .bind(course_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list modules: {e}")))?;

        rows.iter().map(row_to_module).collect()
    }

    /// List a course's modules as {id, label} selector options
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn options_for_course(&self, course_id: Uuid) -> AppResult<Vec<ModuleOption>> {
        let rows = sqlx::query(
            r"
            SELECT id, title
            FROM modules
            WHERE course_id = $1
            ORDER BY position
            ",
        )
        .bind(course_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list module options: {e}")))?;

        rows.iter()
            .map(|row| {
                let id_str: String = row.get("id");
                Ok(ModuleOption {
                    id: Uuid::parse_str(&id_str)
                        .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
                    label: row.get("title"),
                })
            })
            .collect()
    }

    /// Count a course's modules
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn count_for_course(&self, course_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM modules WHERE course_id = $1")
            .bind(course_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count modules: {e}")))?;

        Ok(row.get("count"))
    }

    /// Rename a module
    ///
    /// Returns the updated module, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_title(&self, module_id: Uuid, title: &str) -> AppResult<Option<Module>> {
        let result = sqlx::query("UPDATE modules SET title = $1, updated_at = $2 WHERE id = $3")
            .bind(title)
            .bind(Utc::now().to_rfc3339())
            .bind(module_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update module title: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(module_id).await
    }

    /// Delete a module, optionally deleting its lessons
    ///
    /// Surviving modules of the course are renumbered so positions stay
    /// dense. Lessons left behind keep their module reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete(&self, module_id: Uuid, delete_lessons: bool) -> AppResult<bool> {
        let module_id_str = module_id.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let row = sqlx::query("SELECT course_id FROM modules WHERE id = $1")
            .bind(&module_id_str)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to get module: {e}")))?;
        let Some(row) = row else {
            return Ok(false);
        };
        let course_id: String = row.get("course_id");

        if delete_lessons {
            sqlx::query("DELETE FROM lessons WHERE module_id = $1")
                .bind(&module_id_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete module lessons: {e}")))?;
        }

        sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(&module_id_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete module: {e}")))?;

        renumber_modules(&mut tx, &course_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))?;

        Ok(true)
    }

    /// Apply an explicit ordering to a course's modules
    ///
    /// Writes position = index + 1 for each id in the given order, trusting
    /// the caller's ordering. Ids that do not belong to the course are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn reorder(&self, course_id: Uuid, ordered_ids: &[Uuid]) -> AppResult<()> {
        let course_id_str = course_id.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        for (index, module_id) in ordered_ids.iter().enumerate() {
            let position = i64::try_from(index + 1).unwrap_or(i64::MAX);
            sqlx::query("UPDATE modules SET position = $1 WHERE id = $2 AND course_id = $3")
                .bind(position)
                .bind(module_id.to_string())
                .bind(&course_id_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to reorder modules: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))?;

        Ok(())
    }
}

impl Database {
    /// Create the modules table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_modules(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS modules (
                id TEXT PRIMARY KEY,
                course_id TEXT NOT NULL,
                title TEXT NOT NULL,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_modules_course_id ON modules(course_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Rewrite a course's module positions as 1..n in current position order
async fn renumber_modules(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    course_id: &str,
) -> AppResult<()> {
    let rows = sqlx::query("SELECT id FROM modules WHERE course_id = $1 ORDER BY position")
        .bind(course_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to load modules for renumber: {e}")))?;

    for (index, row) in rows.iter().enumerate() {
        let id: String = row.get("id");
        let position = i64::try_from(index + 1).unwrap_or(i64::MAX);
        sqlx::query("UPDATE modules SET position = $1 WHERE id = $2")
            .bind(position)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to renumber modules: {e}")))?;
    }

    Ok(())
}

/// Convert a database row to a Module struct
fn row_to_module(row: &SqliteRow) -> AppResult<Module> {
    let id_str: String = row.get("id");
    let course_id_str: String = row.get("course_id");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(Module {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        course_id: Uuid::parse_str(&course_id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        title: row.get("title"),
        position: row.get("position"),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}
