// ABOUTME: Core domain models for courses, modules, lessons, users and entitlements
// ABOUTME: Defines the entity structs plus status/type/role enums with storage conversions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

//! # Domain Models
//!
//! Core data structures for the course content hierarchy. A course owns an
//! ordered list of modules; each module owns an ordered list of lessons.
//! Lessons may also hang directly off a course when they have no module yet.

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Publication status of a course
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum CourseStatus {
    /// Not yet visible to customers
    #[default]
    Draft,
    /// Live and listed
    Published,
    /// Published at a future start date
    Scheduled,
}

impl CourseStatus {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
        }
    }
}

impl Display for CourseStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CourseStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "scheduled" => Ok(Self::Scheduled),
            _ => Err(AppError::invalid_input(format!(
                "Invalid course status: {s}"
            ))),
        }
    }
}

/// Top-level purchasable content container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// URL slug, unique across all courses
    pub slug: String,
    /// Publication status
    pub status: CourseStatus,
    /// Start date, relevant when the course is scheduled
    pub start_date: Option<DateTime<Utc>>,
    /// Purchasable product granting access to this course's lessons
    pub product_id: Option<Uuid>,
    /// When the course was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Create a new draft course with the given title and resolved slug
    #[must_use]
    pub fn new(title: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            status: CourseStatus::Draft,
            start_date: None,
            product_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Ordered grouping of lessons within a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Unique module identifier
    pub id: Uuid,
    /// Owning course
    pub course_id: Uuid,
    /// Display title
    pub title: String,
    /// 1-based position within the course, dense after every mutation
    pub position: i64,
    /// When the module was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Module {
    /// Create a new module at the given position
    #[must_use]
    pub fn new(course_id: Uuid, title: String, position: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            course_id,
            title,
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Content type tag of a lesson
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum LessonType {
    /// Written lesson content
    #[default]
    Text,
    /// Video lesson
    Video,
    /// Audio lesson
    Audio,
    /// Quiz lesson
    Quiz,
}

impl LessonType {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Quiz => "quiz",
        }
    }
}

impl Display for LessonType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LessonType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "quiz" => Ok(Self::Quiz),
            _ => Err(AppError::invalid_input(format!("Invalid lesson type: {s}"))),
        }
    }
}

/// Leaf content unit within a module (or directly under a course)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier
    pub id: Uuid,
    /// Owning course
    pub course_id: Uuid,
    /// Owning module, absent while the lesson is unassigned
    pub module_id: Option<Uuid>,
    /// Display title
    pub title: String,
    /// Lesson body
    pub content: String,
    /// Content type tag
    pub lesson_type: LessonType,
    /// 1-based position within its sibling group, dense after every mutation
    pub position: i64,
    /// When the lesson was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Create a new lesson at the given position
    #[must_use]
    pub fn new(
        course_id: Uuid,
        module_id: Option<Uuid>,
        title: String,
        lesson_type: LessonType,
        position: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            course_id,
            module_id,
            title,
            content: String::new(),
            lesson_type,
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Entry in the lesson editor's module selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleOption {
    /// Module identifier
    pub id: Uuid,
    /// Module title shown to the admin
    pub label: String,
}

/// Role controlling what a user may do
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum UserRole {
    /// Can manage courses, modules and lessons
    Admin,
    /// Regular customer account
    #[default]
    Member,
}

impl UserRole {
    /// Whether this role carries the course-management capability
    #[must_use]
    pub const fn can_manage_courses(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address (used for identification)
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Hashed password for authentication
    pub password_hash: String,
    /// Role for the permission check on admin actions
    pub role: UserRole,
    /// Whether the account is active
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last time the user accessed the system
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new member account with the given email and password hash
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            role: UserRole::Member,
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }
}

/// Purchase record granting a user access to a product's courses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    /// Unique entitlement identifier
    pub id: Uuid,
    /// Entitled user
    pub user_id: Uuid,
    /// Purchased product
    pub product_id: Uuid,
    /// When the entitlement was granted
    pub granted_at: DateTime<Utc>,
}

impl Entitlement {
    /// Create a new entitlement for the given user and product
    #[must_use]
    pub fn new(user_id: Uuid, product_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            granted_at: Utc::now(),
        }
    }
}
