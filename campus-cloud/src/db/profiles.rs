//! User profile database operations
//!
//! `grant_vip` is the only mutator of role/vip_expiry_date.

use shared::models::profile::{Role, UserProfile};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    role: String,
    vip_expiry_date: Option<i64>,
    avatar: Option<String>,
}

impl ProfileRow {
    fn into_profile(self) -> UserProfile {
        UserProfile {
            role: Role::parse(&self.role).unwrap_or_default(),
            vip_expiry_date: self.vip_expiry_date,
            avatar: self.avatar,
        }
    }
}

/// Fetch a user's profile. `None` means no row exists; callers fall back to
/// `UserProfile::default()` (regular role).
pub async fn get_profile(pool: &PgPool, user_id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
    let row: Option<ProfileRow> =
        sqlx::query_as("SELECT role, vip_expiry_date, avatar FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(ProfileRow::into_profile))
}

/// 设置 VIP：role=vip，到期时间在 max(now, 当前到期) 基础上延长 duration。
///
/// Upserts so that accounts missing a profile row still end up VIP.
pub async fn grant_vip(
    pool: &PgPool,
    user_id: i64,
    duration_ms: i64,
    now: i64,
) -> Result<UserProfile, sqlx::Error> {
    let row: ProfileRow = sqlx::query_as(
        r#"
        INSERT INTO user_profiles (user_id, role, vip_expiry_date, updated_at)
        VALUES ($1, 'vip', $2 + $3, $2)
        ON CONFLICT (user_id)
        DO UPDATE SET role = 'vip',
                      vip_expiry_date = GREATEST(COALESCE(user_profiles.vip_expiry_date, $2), $2) + $3,
                      updated_at = $2
        RETURNING role, vip_expiry_date, avatar
        "#,
    )
    .bind(user_id)
    .bind(now)
    .bind(duration_ms)
    .fetch_one(pool)
    .await?;
    Ok(row.into_profile())
}

pub async fn update_avatar(
    pool: &PgPool,
    user_id: i64,
    avatar: Option<&str>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_profiles (user_id, role, avatar, updated_at)
         VALUES ($1, 'regular', $2, $3)
         ON CONFLICT (user_id)
         DO UPDATE SET avatar = EXCLUDED.avatar, updated_at = EXCLUDED.updated_at",
    )
    .bind(user_id)
    .bind(avatar)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}
