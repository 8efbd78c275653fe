// ABOUTME: Application constants organized by domain
// ABOUTME: Environment lookups with defaults plus fixed limits shared across modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! # Constants Module
//!
//! Application constants grouped by domain: environment-backed configuration
//! lookups and fixed limits shared across modules.

use std::env;

/// Environment-based configuration
pub mod env_config {
    use super::env;
    use super::limits;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(limits::DEFAULT_HTTP_PORT)
    }

    /// Get log level from environment or default
    #[must_use]
    pub fn log_level() -> String {
        env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned())
    }

    /// Get database URL from environment or default
    #[must_use]
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/lectern.db".to_owned())
    }

    /// Get public base URL for edit/view links from environment or default
    #[must_use]
    pub fn public_url() -> String {
        env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:8081".to_owned())
    }

    /// Get JWT expiry hours from environment or default
    #[must_use]
    pub fn jwt_expiry_hours() -> i64 {
        env::var("JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(limits::USER_SESSION_EXPIRY_HOURS)
    }
}

/// Fixed limits and sizes
pub mod limits {
    /// Default HTTP port when `HTTP_PORT` is unset
    pub const DEFAULT_HTTP_PORT: u16 = 8081;

    /// Maximum stored slug length, suffix included
    pub const MAX_SLUG_LENGTH: usize = 200;

    /// Action token length in bytes (32 bytes = 256 bits)
    pub const ACTION_TOKEN_LENGTH: usize = 32;

    /// Action token lifetime in seconds (24 hours)
    pub const ACTION_TOKEN_EXPIRY_SECS: i64 = 24 * 60 * 60;

    /// Minimum accepted password length at registration
    pub const MIN_PASSWORD_LENGTH: usize = 8;

    /// Default user session expiry in hours
    pub const USER_SESSION_EXPIRY_HOURS: i64 = 24;
}

/// Time conversion constants
pub mod time_constants {
    /// Seconds per hour
    pub const SECONDS_PER_HOUR: u32 = 3600;
}

/// Service identity for logs and diagnostics
pub mod service_names {
    /// Canonical service name
    pub const LECTERN_SERVER: &str = "lectern-server";
}

/// Route prefixes shared between the router and the endpoint listing
pub mod routes {
    /// REST API prefix
    pub const API_PREFIX: &str = "/api";
}
