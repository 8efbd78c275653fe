// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Handles environment-driven configuration parsing and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project
//! Configuration module for the Lectern server
//!
//! Centralized configuration management, loaded from the process environment
//! at startup and validated before the server starts serving.

/// Environment and server configuration
pub mod environment;
