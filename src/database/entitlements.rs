// ABOUTME: Database operations for product entitlements
// ABOUTME: Records purchase-derived access rights consulted by the lesson gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Entitlement;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Entitlement database operations manager
pub struct EntitlementsManager {
    pool: SqlitePool,
}

impl EntitlementsManager {
    /// Create a new entitlements manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Grant a user access to a product
    ///
    /// Idempotent: granting an existing (user, product) pair keeps the
    /// original grant record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn grant(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Entitlement> {
        let entitlement = Entitlement::new(user_id, product_id);

        sqlx::query(
            r"
            INSERT OR IGNORE INTO entitlements (id, user_id, product_id, granted_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(entitlement.id.to_string())
        .bind(entitlement.user_id.to_string())
        .bind(entitlement.product_id.to_string())
        .bind(entitlement.granted_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to grant entitlement: {e}")))?;

        // Re-read so repeated grants return the original record
        self.find(user_id, product_id)
            .await?
            .ok_or_else(|| AppError::database("Entitlement missing after grant"))
    }

    /// Check whether a user holds an entitlement for a product
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn check(&self, user_id: Uuid, product_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM entitlements WHERE user_id = $1 AND product_id = $2")
            .bind(user_id.to_string())
            .bind(product_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check entitlement: {e}")))?;

        Ok(row.is_some())
    }

    /// List a user's entitlements, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Entitlement>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, product_id, granted_at
            FROM entitlements
            WHERE user_id = $1
            ORDER BY granted_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list entitlements: {e}")))?;

        rows.iter().map(row_to_entitlement).collect()
    }

    /// Fetch the entitlement record for a (user, product) pair
    async fn find(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Option<Entitlement>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, product_id, granted_at
            FROM entitlements
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(product_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get entitlement: {e}")))?;

        row.map(|r| row_to_entitlement(&r)).transpose()
    }
}

impl Database {
    /// Create the entitlements table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_entitlements(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS entitlements (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                product_id TEXT NOT NULL,
                granted_at TEXT NOT NULL,
                UNIQUE(user_id, product_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_entitlements_user_id ON entitlements(user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Convert a database row to an Entitlement struct
fn row_to_entitlement(row: &SqliteRow) -> AppResult<Entitlement> {
    let id_str: String = row.get("id");
    let user_id_str: String = row.get("user_id");
    let product_id_str: String = row.get("product_id");
    let granted_at_str: String = row.get("granted_at");

    Ok(Entitlement {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        user_id: Uuid::parse_str(&user_id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        product_id: Uuid::parse_str(&product_id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        granted_at: DateTime::parse_from_rfc3339(&granted_at_str)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}
