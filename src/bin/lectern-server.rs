// ABOUTME: Main server binary wiring configuration, database, and HTTP routes together
// ABOUTME: Boots the course service with optional admin bootstrap and demo content seeding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! # Lectern Server Binary
//!
//! This binary starts the course management service with user authentication,
//! action token protection, and entitlement-gated lesson access.

use anyhow::Result;
use clap::Parser;
use lectern_server::{
    auth::{generate_jwt_secret, AuthManager},
    config::environment::{DatabaseUrl, ServerConfig},
    database::{users::UsersManager, Database},
    logging,
    models::{User, UserRole},
    resources::ServerResources,
    seed,
    server::LecternServer,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "lectern-server")]
#[command(about = "Lectern - course content service with entitlement-gated lessons")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle container environments where clap may not work properly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using configuration from environment");
            Args {
                http_port: None,
                database_url: None,
            }
        }
    };

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(database_url);
    }

    // Initialize production logging
    logging::init_from_env()?;

    info!("Starting Lectern Server");
    info!("{}", config.summary());

    // Initialize database and schema
    let database = Database::new(&config.database.url.to_connection_string()).await?;
    if config.database.auto_migrate {
        database.migrate().await?;
        info!("Database schema ready: {}", config.database.url);
    } else {
        warn!("Automatic migrations disabled; assuming schema is current");
    }

    // JWT secret from configuration, or an ephemeral one per process
    let jwt_secret = config.auth.jwt_secret.as_ref().map_or_else(
        || {
            warn!("JWT_SECRET not set; sessions will not survive a restart");
            generate_jwt_secret()
        },
        |secret| secret.as_bytes().to_vec(),
    );

    let auth_manager = AuthManager::new(&jwt_secret, config.auth.jwt_expiry_hours);
    info!("Authentication manager initialized");

    bootstrap_admin(&config, &database).await?;

    if config.content.seed_demo_content {
        seed::ensure_demo_content(&database).await?;
    }

    // Create server resources and server
    let config = Arc::new(config);
    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        config.clone(),
    ));
    let server = LecternServer::new(resources);

    info!("Server starting on port {}", config.http_port);
    display_available_endpoints(&config);
    info!("Ready to serve courses!");

    if let Err(e) = server.run(config.http_port).await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Create the configured bootstrap admin account if it does not exist yet
async fn bootstrap_admin(config: &ServerConfig, database: &Database) -> Result<()> {
    let (Some(email), Some(password)) = (
        config.auth.bootstrap_admin_email.as_ref(),
        config.auth.bootstrap_admin_password.as_ref(),
    ) else {
        return Ok(());
    };

    let users = UsersManager::new(database.pool().clone());
    if users.get_by_email(email).await?.is_some() {
        info!("Bootstrap admin account already exists: {email}");
        return Ok(());
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let mut user = User::new(email.clone(), password_hash, Some("Administrator".to_owned()));
    user.role = UserRole::Admin;
    let user_id = users.create(&user).await?;
    info!("Bootstrap admin created: {email} ({user_id})");

    Ok(())
}

/// Display all available API endpoints
fn display_available_endpoints(config: &ServerConfig) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());

    info!("=== Available API Endpoints ===");
    display_auth_endpoints(&host, config.http_port);
    display_course_endpoints(&host, config.http_port);
    display_module_endpoints(&host, config.http_port);
    display_lesson_endpoints(&host, config.http_port);
    display_member_endpoints(&host, config.http_port);
    info!("=== End of Endpoint List ===");
}

#[allow(clippy::cognitive_complexity)]
fn display_auth_endpoints(host: &str, port: u16) {
    info!("Authentication:");
    info!("   User Registration: POST http://{host}:{port}/api/auth/register");
    info!("   User Login:        POST http://{host}:{port}/api/auth/login");
    info!("   Action Tokens:     GET  http://{host}:{port}/api/action-tokens");
    info!("   Health Check:      GET  http://{host}:{port}/api/health");
}

#[allow(clippy::cognitive_complexity)]
fn display_course_endpoints(host: &str, port: u16) {
    info!("Course Management:");
    info!("   Create Course:     POST http://{host}:{port}/api/courses");
    info!("   List Courses:      GET  http://{host}:{port}/api/courses");
    info!("   Get Course:        GET  http://{host}:{port}/api/courses/{{id}}");
    info!("   Rename Course:     PUT  http://{host}:{port}/api/courses/{{id}}/title");
    info!("   Update Slug:       PUT  http://{host}:{port}/api/courses/{{id}}/slug");
    info!("   Update Details:    PUT  http://{host}:{port}/api/courses/{{id}}/details");
    info!("   Delete Course:     DELETE http://{host}:{port}/api/courses/{{id}}");
    info!("   Course Modules:    GET  http://{host}:{port}/api/courses/{{id}}/modules");
    info!("   Module Options:    GET  http://{host}:{port}/api/courses/{{id}}/module-options");
    info!("   Unmoduled Lessons: GET  http://{host}:{port}/api/courses/{{id}}/lessons");
}

#[allow(clippy::cognitive_complexity)]
fn display_module_endpoints(host: &str, port: u16) {
    info!("Module Management:");
    info!("   Create Module:     POST http://{host}:{port}/api/modules");
    info!("   Rename Module:     PUT  http://{host}:{port}/api/modules/{{id}}/title");
    info!("   Delete Module:     DELETE http://{host}:{port}/api/modules/{{id}}");
    info!("   Reorder Modules:   PUT  http://{host}:{port}/api/modules/order");
    info!("   Module Lessons:    GET  http://{host}:{port}/api/modules/{{id}}/lessons");
}

#[allow(clippy::cognitive_complexity)]
fn display_lesson_endpoints(host: &str, port: u16) {
    info!("Lesson Management:");
    info!("   Create Lesson:     POST http://{host}:{port}/api/lessons");
    info!("   Delete Lesson:     DELETE http://{host}:{port}/api/lessons/{{id}}");
    info!("   Reorder Lessons:   PUT  http://{host}:{port}/api/lessons/order");
}

#[allow(clippy::cognitive_complexity)]
fn display_member_endpoints(host: &str, port: u16) {
    info!("Member Access:");
    info!("   View Lesson:       GET  http://{host}:{port}/api/lessons/{{id}}/view");
    info!("   Grant Entitlement: POST http://{host}:{port}/api/entitlements");
}
