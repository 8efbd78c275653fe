// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Contains shared helpers for inbound text sanitization and slug generation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Lectern Project

/// HTML escaping for server-rendered views
pub mod html;
/// Text sanitization and slug helpers
pub mod text;
