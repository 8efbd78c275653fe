// ABOUTME: Security utilities for request authentication support
// ABOUTME: Cookie parsing and action token management for state-changing operations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Lectern Project

//! Security support modules

/// Cookie header parsing
pub mod cookies;
/// Action token generation and validation
pub mod tokens;
