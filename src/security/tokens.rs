// ABOUTME: Action token generation and validation for state-changing admin operations
// ABOUTME: Provides per-action secure tokens tied to users with configurable expiration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Lectern Project

//! Action token module
//!
//! Every state-changing course management request must carry a token scoped
//! to the acting user and the specific action. Tokens are random 256-bit
//! values, stay valid for 24 hours, and may be reused within that window.

use crate::constants::limits::{ACTION_TOKEN_EXPIRY_SECS, ACTION_TOKEN_LENGTH};
use crate::errors::{AppError, AppResult};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Action names protected by tokens
pub mod actions {
    /// Create a course
    pub const ADD_COURSE: &str = "add_course";
    /// Rename a course
    pub const RENAME_COURSE: &str = "rename_course";
    /// Change a course slug
    pub const UPDATE_COURSE_SLUG: &str = "update_course_slug";
    /// Update course status, start date, or product link
    pub const UPDATE_COURSE_DETAILS: &str = "update_course_details";
    /// Delete a course
    pub const DELETE_COURSE: &str = "delete_course";
    /// Create a module
    pub const ADD_MODULE: &str = "add_module";
    /// Rename a module
    pub const RENAME_MODULE: &str = "rename_module";
    /// Delete a module
    pub const DELETE_MODULE: &str = "delete_module";
    /// Persist module ordering
    pub const REORDER_MODULES: &str = "reorder_modules";
    /// Create a lesson
    pub const ADD_LESSON: &str = "add_lesson";
    /// Delete a lesson
    pub const DELETE_LESSON: &str = "delete_lesson";
    /// Persist lesson ordering
    pub const REORDER_LESSONS: &str = "reorder_lessons";
    /// Grant a product entitlement to a user
    pub const GRANT_ENTITLEMENT: &str = "grant_entitlement";

    /// Every protected action, in issue order
    pub const ALL: &[&str] = &[
        ADD_COURSE,
        RENAME_COURSE,
        UPDATE_COURSE_SLUG,
        UPDATE_COURSE_DETAILS,
        DELETE_COURSE,
        ADD_MODULE,
        RENAME_MODULE,
        DELETE_MODULE,
        REORDER_MODULES,
        ADD_LESSON,
        DELETE_LESSON,
        REORDER_LESSONS,
        GRANT_ENTITLEMENT,
    ];
}

/// Action token metadata (token itself is the `HashMap` key)
#[derive(Clone)]
struct ActionToken {
    user_id: uuid::Uuid,
    action: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

/// Action token manager with in-memory storage
///
/// In production, consider using Redis or database storage
/// for distributed systems.
pub struct ActionTokenManager {
    tokens: Arc<RwLock<HashMap<String, ActionToken>>>,
}

impl ActionTokenManager {
    /// Create a new action token manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Generate a new token for a user and action
    ///
    /// # Errors
    /// This function is currently infallible but returns `AppResult` for future extensibility
    pub async fn generate_token(&self, user_id: uuid::Uuid, action: &str) -> AppResult<String> {
        // Generate cryptographically secure random bytes
        let random_bytes: Vec<u8> = (0..ACTION_TOKEN_LENGTH)
            .map(|_| rand::thread_rng().gen())
            .collect();

        let token = hex::encode(random_bytes);
        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(ACTION_TOKEN_EXPIRY_SECS);

        // Store token and cleanup expired tokens
        let mut tokens = self.tokens.write().await;
        tokens.insert(
            token.clone(),
            ActionToken {
                user_id,
                action: action.to_owned(),
                expires_at,
            },
        );

        // Cleanup expired tokens (simple cleanup on insert)
        Self::cleanup_expired_tokens_locked(&mut tokens);
        drop(tokens);

        Ok(token)
    }

    /// Issue one token per protected action for a user
    ///
    /// # Errors
    /// Returns an error if token generation fails
    pub async fn issue_all(&self, user_id: uuid::Uuid) -> AppResult<HashMap<String, String>> {
        let mut issued = HashMap::with_capacity(actions::ALL.len());
        for action in actions::ALL {
            let token = self.generate_token(user_id, action).await?;
            issued.insert((*action).to_owned(), token);
        }
        Ok(issued)
    }

    /// Validate a token for a user and action
    ///
    /// Tokens are reusable within their expiry window, so validation does
    /// not consume them.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Token is not found
    /// - Token has expired
    /// - Token user ID doesn't match the provided user ID
    /// - Token was issued for a different action
    pub async fn validate_token(
        &self,
        token: &str,
        user_id: uuid::Uuid,
        action: &str,
    ) -> AppResult<()> {
        let action_token = {
            let tokens = self.tokens.read().await;
            tokens
                .get(token)
                .ok_or_else(|| AppError::auth_invalid("Invalid action token"))?
                .clone()
        };

        // Check expiration
        if chrono::Utc::now() > action_token.expires_at {
            return Err(AppError::auth_invalid("Action token expired"));
        }

        // Check user ID
        if action_token.user_id != user_id {
            return Err(AppError::auth_invalid("Action token user mismatch"));
        }

        // Check action scope
        if action_token.action != action {
            return Err(AppError::auth_invalid(format!(
                "Action token not valid for {action}"
            )));
        }

        Ok(())
    }

    /// Cleanup expired tokens (internal helper)
    fn cleanup_expired_tokens_locked(tokens: &mut HashMap<String, ActionToken>) {
        let now = chrono::Utc::now();
        tokens.retain(|_, action_token| action_token.expires_at > now);
    }

    /// Cleanup expired tokens (public method)
    pub async fn cleanup_expired_tokens(&self) {
        let mut tokens = self.tokens.write().await;
        Self::cleanup_expired_tokens_locked(&mut tokens);
    }
}

impl Default for ActionTokenManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_and_validate() {
        let manager = ActionTokenManager::new();
        let user_id = uuid::Uuid::new_v4();

        let token = manager
            .generate_token(user_id, actions::ADD_COURSE)
            .await
            .unwrap();

        assert_eq!(token.len(), ACTION_TOKEN_LENGTH * 2);
        manager
            .validate_token(&token, user_id, actions::ADD_COURSE)
            .await
            .unwrap();

        // Reusable within the expiry window
        manager
            .validate_token(&token, user_id, actions::ADD_COURSE)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejects_wrong_user() {
        let manager = ActionTokenManager::new();
        let token = manager
            .generate_token(uuid::Uuid::new_v4(), actions::DELETE_COURSE)
            .await
            .unwrap();

        let result = manager
            .validate_token(&token, uuid::Uuid::new_v4(), actions::DELETE_COURSE)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejects_wrong_action() {
        let manager = ActionTokenManager::new();
        let user_id = uuid::Uuid::new_v4();
        let token = manager
            .generate_token(user_id, actions::ADD_MODULE)
            .await
            .unwrap();

        let result = manager
            .validate_token(&token, user_id, actions::DELETE_MODULE)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejects_unknown_token() {
        let manager = ActionTokenManager::new();
        let result = manager
            .validate_token("deadbeef", uuid::Uuid::new_v4(), actions::ADD_COURSE)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_issue_all_covers_every_action() {
        let manager = ActionTokenManager::new();
        let user_id = uuid::Uuid::new_v4();

        let issued = manager.issue_all(user_id).await.unwrap();

        assert_eq!(issued.len(), actions::ALL.len());
        for action in actions::ALL {
            let token = issued.get(*action).unwrap();
            manager.validate_token(token, user_id, action).await.unwrap();
        }
    }
}
