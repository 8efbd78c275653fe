// ABOUTME: Application settings database operations for startup flags
// ABOUTME: Provides get/set operations for settings like the demo content guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

use super::Database;
use crate::errors::{AppError, AppResult};
use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// Application setting key constants
pub const SETTING_DEMO_CONTENT_CREATED: &str = "demo_content_created";

/// An application setting entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSetting {
    /// Unique key identifier for the setting
    pub key: String,
    /// The current value of the setting
    pub value: String,
    /// When the setting was last modified
    pub updated_at: chrono::DateTime<Utc>,
}

impl Database {
    /// Create the `app_settings` table
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails
    pub(super) async fn migrate_settings(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS app_settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get an application setting by key
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_app_setting(&self, key: &str) -> AppResult<Option<AppSetting>> {
        let row = sqlx::query(
            r"
            SELECT key, value, updated_at
            FROM app_settings
            WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get app setting: {e}")))?;

        row.map_or(Ok(None), |row| {
            let updated_at_str: String = row.get("updated_at");
            let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at_str)
                .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

            Ok(Some(AppSetting {
                key: row.get("key"),
                value: row.get("value"),
                updated_at,
            }))
        })
    }

    /// Set an application setting value
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn set_app_setting(&self, key: &str, value: &str) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO app_settings (key, value, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = ?2,
                updated_at = ?3
            ",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to set app setting: {e}")))?;

        Ok(())
    }

    /// Check whether demo content has already been seeded
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn is_demo_content_created(&self) -> AppResult<bool> {
        match self.get_app_setting(SETTING_DEMO_CONTENT_CREATED).await? {
            Some(setting) => Ok(setting.value.eq_ignore_ascii_case("true")),
            None => Ok(false),
        }
    }

    /// Record that demo content has been seeded
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn mark_demo_content_created(&self) -> AppResult<()> {
        self.set_app_setting(SETTING_DEMO_CONTENT_CREATED, "true")
            .await
    }
}
