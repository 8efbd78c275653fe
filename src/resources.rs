// ABOUTME: Centralized resource container for dependency injection in the HTTP server
// ABOUTME: Manages shared resources like the database pool, auth manager and action tokens
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Lectern Project

//! # Server Resources Module
//!
// NOTE: The `.clone()` calls in this file are Arc sharing of expensive
// resources (database, auth managers) across handlers, not deep copies.
//!
//! Centralized resource container for dependency injection. Route handlers
//! receive one `Arc<ServerResources>` instead of re-creating managers.

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::middleware::AuthMiddleware;
use crate::security::tokens::ActionTokenManager;
use std::sync::Arc;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Shared database handle
    pub database: Arc<Database>,
    /// JWT issuing and validation
    pub auth_manager: Arc<AuthManager>,
    /// Request authentication (bearer header or cookie)
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Per-action anti-forgery tokens
    pub action_tokens: Arc<ActionTokenManager>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        let database_arc = Arc::new(database);
        let auth_middleware = Arc::new(AuthMiddleware::new(
            auth_manager.clone(),
            database_arc.clone(),
        ));

        Self {
            database: database_arc,
            auth_manager: Arc::new(auth_manager),
            auth_middleware,
            action_tokens: Arc::new(ActionTokenManager::new()),
            config,
        }
    }
}
