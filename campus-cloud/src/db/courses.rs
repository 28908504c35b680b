//! Course catalog and membership database operations

use shared::models::course::Course;
use sqlx::PgPool;

pub async fn list_courses(pool: &PgPool, tag: Option<&str>) -> Result<Vec<Course>, sqlx::Error> {
    match tag {
        Some(tag) => {
            sqlx::query_as(
                r#"
                SELECT c.id, c.title, c.description, c.price, c.feature, c.thumbnail,
                       c.created_at, c.updated_at
                FROM courses c
                JOIN course_tags ct ON ct.course_id = c.id
                JOIN tags t ON t.id = ct.tag_id
                WHERE t.name = $1
                ORDER BY c.created_at DESC
                "#,
            )
            .bind(tag)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as(
                "SELECT id, title, description, price, feature, thumbnail, created_at, updated_at
                 FROM courses ORDER BY created_at DESC",
            )
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn get_course(pool: &PgPool, id: i64) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, title, description, price, feature, thumbnail, created_at, updated_at
         FROM courses WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Substring match over title and description
pub async fn search(pool: &PgPool, query: &str, limit: i64) -> Result<Vec<Course>, sqlx::Error> {
    let pattern = format!("%{query}%");
    sqlx::query_as(
        "SELECT id, title, description, price, feature, thumbnail, created_at, updated_at
         FROM courses
         WHERE title ILIKE $1 OR description ILIKE $1
         ORDER BY created_at DESC
         LIMIT $2",
    )
    .bind(&pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
}

// ── Membership set (written only by the order engine) ──

pub async fn is_member(pool: &PgPool, course_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM course_members WHERE course_id = $1 AND user_id = $2)",
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Grant membership inside the caller's transaction.
pub async fn add_member(
    conn: &mut sqlx::PgConnection,
    course_id: i64,
    user_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO course_members (course_id, user_id, granted_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (course_id, user_id) DO NOTHING",
    )
    .bind(course_id)
    .bind(user_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Revoke membership inside the caller's transaction. Removing a non-member
/// is a no-op.
pub async fn remove_member(
    conn: &mut sqlx::PgConnection,
    course_id: i64,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM course_members WHERE course_id = $1 AND user_id = $2")
        .bind(course_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Courses the user has been granted access to (the derived membership set)
pub async fn list_owned_courses(pool: &PgPool, user_id: i64) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT c.id, c.title, c.description, c.price, c.feature, c.thumbnail,
               c.created_at, c.updated_at
        FROM courses c
        JOIN course_members m ON m.course_id = c.id
        WHERE m.user_id = $1
        ORDER BY m.granted_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
