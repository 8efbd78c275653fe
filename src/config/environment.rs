// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Lectern Project

//! Environment-based configuration management for production deployment

use crate::constants::{env_config, limits};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Standard operational logging
    #[default]
    Info,
    /// Verbose debugging output
    Debug,
    /// Maximum verbosity
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info, // Default fallback
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for deployment-specific behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated testing
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development, // Default fallback for unrecognized values
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string
    ///
    /// Strings without a `sqlite:` scheme are treated as file paths.
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("data/lectern.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Content behavior settings
    pub content: ContentConfig,
    /// Security settings
    pub security: SecurityConfig,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite path or `:memory:`)
    pub url: DatabaseUrl,
    /// Enable database migrations on startup
    pub auto_migrate: bool,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret; generated fresh at startup when unset
    pub jwt_secret: Option<String>,
    /// JWT expiry time in hours
    pub jwt_expiry_hours: i64,
    /// Email of the admin account provisioned at startup
    pub bootstrap_admin_email: Option<String>,
    /// Password of the admin account provisioned at startup
    pub bootstrap_admin_password: Option<String>,
}

/// Content behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Public base URL used to build edit/view links
    pub public_url: String,
    /// Create the demo course on first startup
    pub seed_demo_content: bool,
}

/// Security settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparsable, or when
    /// validation fails.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: env_config::http_port(),
            log_level: LogLevel::from_str_or_default(&env_config::log_level()),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )?),

            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_config::database_url()),
                auto_migrate: env_var_or("AUTO_MIGRATE", "true")?
                    .parse()
                    .context("Invalid AUTO_MIGRATE value")?,
            },

            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").ok(),
                jwt_expiry_hours: env_config::jwt_expiry_hours(),
                bootstrap_admin_email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
                bootstrap_admin_password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
            },

            content: ContentConfig {
                public_url: normalize_base_url(&env_config::public_url()),
                seed_demo_content: env_var_or("SEED_DEMO_CONTENT", "false")?
                    .parse()
                    .context("Invalid SEED_DEMO_CONTENT value")?,
            },

            security: SecurityConfig {
                cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")?),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when settings are inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }

        if self.content.public_url.is_empty() {
            return Err(anyhow::anyhow!("PUBLIC_URL cannot be empty"));
        }

        if self.auth.bootstrap_admin_email.is_some() != self.auth.bootstrap_admin_password.is_some()
        {
            return Err(anyhow::anyhow!(
                "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
            ));
        }

        if let Some(password) = &self.auth.bootstrap_admin_password {
            if password.len() < limits::MIN_PASSWORD_LENGTH {
                return Err(anyhow::anyhow!(
                    "BOOTSTRAP_ADMIN_PASSWORD must be at least {} characters",
                    limits::MIN_PASSWORD_LENGTH
                ));
            }
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Lectern Server Configuration:\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - Public URL: {}\n\
             - Demo Content: {}\n\
             - Bootstrap Admin: {}",
            self.http_port,
            self.log_level,
            self.environment,
            self.database.url,
            self.content.public_url,
            if self.content.seed_demo_content {
                "Enabled"
            } else {
                "Disabled"
            },
            if self.auth.bootstrap_admin_email.is_some() {
                "Configured"
            } else {
                "Not configured"
            },
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: limits::DEFAULT_HTTP_PORT,
            log_level: LogLevel::Info,
            environment: Environment::Development,
            database: DatabaseConfig {
                url: DatabaseUrl::Memory,
                auto_migrate: true,
            },
            auth: AuthConfig {
                jwt_secret: None,
                jwt_expiry_hours: 24,
                bootstrap_admin_email: None,
                bootstrap_admin_password: None,
            },
            content: ContentConfig {
                public_url: format!("http://localhost:{}", limits::DEFAULT_HTTP_PORT),
                seed_demo_content: false,
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_owned()],
            },
        }
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> Result<String> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_owned()))
}

/// Strip a trailing slash so URL joins stay single-slashed
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:"), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:data/courses.db"),
            DatabaseUrl::SQLite {
                path: PathBuf::from("data/courses.db")
            }
        );
        // Bare paths are treated as SQLite files
        assert_eq!(
            DatabaseUrl::parse_url("courses.db"),
            DatabaseUrl::SQLite {
                path: PathBuf::from("courses.db")
            }
        );
    }

    #[test]
    fn test_log_level_fallback() {
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*".to_owned()]);
        assert_eq!(
            parse_origins("http://a.test, http://b.test"),
            vec!["http://a.test".to_owned(), "http://b.test".to_owned()]
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://x.test/"), "http://x.test");
        assert_eq!(normalize_base_url("http://x.test"), "http://x.test");
    }

    #[test]
    fn test_default_config_validates() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bootstrap_admin_requires_both_vars() {
        let mut config = ServerConfig::default();
        config.auth.bootstrap_admin_email = Some("ops@example.com".to_owned());
        assert!(config.validate().is_err());

        config.auth.bootstrap_admin_password = Some("a-long-password".to_owned());
        assert!(config.validate().is_ok());
    }
}
