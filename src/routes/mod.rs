// ABOUTME: Route module organization for Lectern Server HTTP endpoints
// ABOUTME: Provides centralized route definitions organized by domain with clean separation of concerns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! Route module for Lectern Server
//!
//! This module organizes all HTTP routes by domain for better maintainability
//! and clear separation of concerns. Each domain module contains only route
//! definitions and thin handler functions that delegate to the database
//! managers.

/// Member-facing lesson view route behind the entitlement gate
pub mod access;
/// Authentication routes for registration and login
pub mod auth;
/// Course management routes
pub mod courses;
/// Entitlement granting routes
pub mod entitlements;
/// Health check and system status routes
pub mod health;
/// Lesson management routes
pub mod lessons;
/// Module management routes
pub mod modules;
/// Action token issuance routes
pub mod tokens;

// Re-export the route handlers for server assembly

/// Lesson access gate route handlers
pub use access::AccessRoutes;
/// Authentication route handlers
pub use auth::AuthRoutes;
/// Course route handlers
pub use courses::CoursesRoutes;
/// Entitlement route handlers
pub use entitlements::EntitlementsRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Lesson route handlers
pub use lessons::LessonsRoutes;
/// Module route handlers
pub use modules::ModulesRoutes;
/// Action token route handlers
pub use tokens::TokenRoutes;
