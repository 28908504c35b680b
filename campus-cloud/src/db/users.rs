//! User account database operations

use sqlx::PgPool;

#[derive(sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: i64,
}

/// Result row for user search
#[derive(sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Insert a new account together with its default profile row.
pub async fn create(
    pool: &PgPool,
    id: i64,
    username: &str,
    email: &str,
    hashed_password: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO users (id, username, email, hashed_password, first_name, last_name, created_at)
         VALUES ($1, $2, $3, $4, '', '', $5)",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(hashed_password)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    // Every account carries a profile row from day one (regular role)
    sqlx::query("INSERT INTO user_profiles (user_id, role, updated_at) VALUES ($1, 'regular', $2)")
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn update_contact(
    pool: &PgPool,
    user_id: i64,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET email = $1, first_name = $2, last_name = $3 WHERE id = $4")
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_password(
    pool: &PgPool,
    user_id: i64,
    hashed_password: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
        .bind(hashed_password)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Substring match over username and names
pub async fn search(
    pool: &PgPool,
    query: &str,
    limit: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    let pattern = format!("%{query}%");
    sqlx::query_as(
        "SELECT id, username, first_name, last_name FROM users
         WHERE username ILIKE $1 OR first_name ILIKE $1 OR last_name ILIKE $1
         ORDER BY username
         LIMIT $2",
    )
    .bind(&pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
}
