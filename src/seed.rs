// ABOUTME: Demo content seeding for first-run installations
// ABOUTME: Creates a starter course and lesson once, guarded by a settings flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Lectern Project

use crate::database::courses::CoursesManager;
use crate::database::lessons::LessonsManager;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::LessonType;
use tracing::{debug, info};

/// Title of the seeded starter course
const DEMO_COURSE_TITLE: &str = "My First Course";
/// Title of the seeded starter lesson
const DEMO_LESSON_TITLE: &str = "Lesson #1";
/// Body content of the seeded starter lesson
const DEMO_LESSON_CONTENT: &str = "This is your first e-course lesson.";

/// Seed the starter course and lesson on first run
///
/// Creates a draft course with one unmoduled lesson, then records a settings
/// flag so subsequent startups skip the whole step. Safe to call on every
/// boot.
///
/// # Errors
///
/// Returns an error if a database operation fails
pub async fn ensure_demo_content(database: &Database) -> AppResult<()> {
    if database.is_demo_content_created().await? {
        debug!("Demo content already seeded, skipping");
        return Ok(());
    }

    let courses = CoursesManager::new(database.pool().clone());
    let lessons = LessonsManager::new(database.pool().clone());

    let course = courses.create(DEMO_COURSE_TITLE, None).await?;
    let lesson = lessons
        .create(course.id, None, DEMO_LESSON_TITLE, LessonType::Text)
        .await?;
    lessons.update_content(lesson.id, DEMO_LESSON_CONTENT).await?;

    database.mark_demo_content_created().await?;

    info!(
        course_id = %course.id,
        lesson_id = %lesson.id,
        "Seeded demo course content"
    );

    Ok(())
}
