//! Tag database operations

use shared::models::tag::Tag;
use sqlx::PgPool;

/// Tags attached to a course (for detail views)
pub async fn list_for_course(pool: &PgPool, course_id: i64) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT t.id, t.name, t.created_at, t.updated_at
        FROM tags t
        JOIN course_tags ct ON ct.tag_id = t.id
        WHERE ct.course_id = $1
        ORDER BY t.name
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}
