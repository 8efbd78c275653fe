// ABOUTME: Inbound text sanitization helpers for admin-supplied titles and content
// ABOUTME: Strips HTML tags, normalizes whitespace and derives URL slugs from titles
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Lectern Project

//! Text sanitization helpers
//!
//! Admin-supplied text fields arrive unsanitized. Titles and slugs pass
//! through [`sanitize_text`] / [`slugify`] before storage; lesson bodies keep
//! their layout but have markup removed via [`strip_tags`].

use regex::Regex;
use std::sync::OnceLock;

/// Compiled regex matching HTML tags, `None` if the pattern failed to compile
fn tag_regex() -> Option<&'static Regex> {
    static TAG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    TAG_REGEX
        .get_or_init(|| Regex::new(r"<[^>]*>").ok())
        .as_ref()
}

/// Remove HTML tags from a string, preserving the surrounding text
#[must_use]
pub fn strip_tags(input: &str) -> String {
    tag_regex().map_or_else(
        || input.to_owned(),
        |re| re.replace_all(input, "").into_owned(),
    )
}

/// Sanitize a single-line text field: strip tags and collapse whitespace runs
#[must_use]
pub fn sanitize_text(input: &str) -> String {
    let stripped = strip_tags(input);
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive a URL slug from arbitrary text
///
/// Lowercases the input and reduces it to alphanumeric runs joined by single
/// hyphens, with no leading or trailing hyphen. Tags are stripped first so a
/// pasted rich-text title cannot leak markup into the slug.
#[must_use]
pub fn slugify(input: &str) -> String {
    let lowered = strip_tags(input).to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Truncate a slug to at most `max_len` characters
///
/// Trailing hyphens left by the cut are trimmed so a numeric suffix can be
/// appended without producing a double hyphen.
#[must_use]
pub fn truncate_slug(slug: &str, max_len: usize) -> String {
    if slug.len() <= max_len {
        return slug.to_owned();
    }
    let truncated: String = slug.chars().take(max_len).collect();
    truncated.trim_end_matches('-').to_owned()
}
