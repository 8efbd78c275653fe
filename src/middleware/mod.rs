// ABOUTME: HTTP middleware for request authentication and authorization
// ABOUTME: Provides JWT/cookie authentication, the admin guard and CORS setup

/// Admin authorization guard
pub mod admin_guard;
/// Authentication middleware
pub mod auth;
/// CORS configuration
pub mod cors;

pub use auth::AuthMiddleware;
pub use cors::setup_cors;
