// ABOUTME: Main library entry point for the Lectern course content service
// ABOUTME: Provides course, module, and lesson management with entitlement-gated access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

// Crate-level attributes:
// - recursion_limit: Increased from default 128 to 256 for complex derive macros
//   (serde, thiserror) on deeply nested types
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Lectern Server
//!
//! A course content service: site owners structure a purchasable course as an
//! ordered hierarchy of modules and lessons, manage that hierarchy through an
//! admin REST surface, and gate lesson access to entitled customers.
//!
//! ## Features
//!
//! - **Course hierarchy**: courses own ordered modules, modules own ordered lessons
//! - **Dense ordering**: 1-based contiguous positions maintained across insert,
//!   delete, and drag-reorder
//! - **Slug uniqueness**: automatic numeric-suffix collision resolution
//! - **Cascade deletes**: explicit flags control whether children are removed
//! - **Action tokens**: per-action anti-forgery tokens on every mutation
//! - **Access gate**: lesson viewing restricted to admins, free courses, and
//!   entitled customers
//!
//! ## Quick Start
//!
//! 1. Configure the service through environment variables (`DATABASE_URL`,
//!    `JWT_SECRET`, `PUBLIC_URL`)
//! 2. Start the service with the `lectern-server` binary
//! 3. Register a user, log in, and fetch action tokens for the admin UI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lectern_server::config::environment::ServerConfig;
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     // Load configuration
//!     let config = ServerConfig::from_env()?;
//!
//!     println!("Lectern Server configured with port: HTTP={}", config.http_port);
//!
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the server binary (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access them.

/// Authentication and session management
pub mod auth;

/// Configuration management and validation
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Course, module, lesson, user, and entitlement storage
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for authentication, authorization, and CORS
pub mod middleware;

/// Common data models for courses, modules, lessons, users, and entitlements
pub mod models;

/// Centralized shared server resources
pub mod resources;

/// HTTP routes for the admin and member surfaces
pub mod routes;

/// Security primitives: cookies and per-action anti-forgery tokens
pub mod security;

/// One-time demo content seeding
pub mod seed;

/// HTTP server assembly and lifecycle
pub mod server;

/// Utility functions and helpers
pub mod utils;
