//! Lesson database operations

use shared::models::lesson::{Lesson, VideoSource};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct LessonRow {
    id: i64,
    course_id: i64,
    title: String,
    free_preview: bool,
    video_source: String,
    video_url: Option<String>,
    content: String,
    created_at: i64,
    updated_at: i64,
}

impl LessonRow {
    fn into_lesson(self) -> Lesson {
        Lesson {
            id: self.id,
            course_id: self.course_id,
            title: self.title,
            free_preview: self.free_preview,
            video_source: VideoSource::parse(&self.video_source).unwrap_or_default(),
            video_url: self.video_url,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// All lessons of a course, unfiltered — gating happens in the entitlement
/// resolver before this list is ever exposed.
pub async fn list_lessons(pool: &PgPool, course_id: i64) -> Result<Vec<Lesson>, sqlx::Error> {
    let rows: Vec<LessonRow> = sqlx::query_as(
        "SELECT id, course_id, title, free_preview, video_source, video_url, content,
                created_at, updated_at
         FROM lessons WHERE course_id = $1 ORDER BY created_at, id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(LessonRow::into_lesson).collect())
}

pub async fn get_lesson(pool: &PgPool, id: i64) -> Result<Option<Lesson>, sqlx::Error> {
    let row: Option<LessonRow> = sqlx::query_as(
        "SELECT id, course_id, title, free_preview, video_source, video_url, content,
                created_at, updated_at
         FROM lessons WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(LessonRow::into_lesson))
}
