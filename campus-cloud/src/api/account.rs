//! Account endpoints: profile view/update, own orders and courses, VIP grant

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::course::Course;
use shared::models::order::Order;
use shared::models::profile::Role;

use crate::auth::UserIdentity;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, internal, require_admin};

/// GET /api/user/me
#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub vip_expiry_date: Option<i64>,
    pub avatar: Option<String>,
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<MeResponse> {
    let user = db::users::find_by_id(&state.pool, identity.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let profile = db::profiles::get_profile(&state.pool, user.id)
        .await
        .map_err(internal)?
        .unwrap_or_default();

    Ok(Json(MeResponse {
        user_id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        role: profile.role,
        vip_expiry_date: profile.vip_expiry_date,
        avatar: profile.avatar,
    }))
}

/// POST /api/user/update_profile
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Avatar URL in the external blob store (upload happens elsewhere)
    pub avatar: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<serde_json::Value> {
    db::users::update_contact(
        &state.pool,
        identity.user_id,
        req.email.trim(),
        req.first_name.trim(),
        req.last_name.trim(),
    )
    .await
    .map_err(internal)?;

    if let Some(avatar) = &req.avatar {
        let now = shared::util::now_millis();
        db::profiles::update_avatar(&state.pool, identity.user_id, Some(avatar), now)
            .await
            .map_err(internal)?;
    }

    Ok(Json(serde_json::json!({ "message": "Profile updated" })))
}

/// GET /api/user/orders
pub async fn list_my_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<Order>> {
    let orders = db::orders::list_for_user(&state.pool, identity.user_id)
        .await
        .map_err(internal)?;
    Ok(Json(orders))
}

/// GET /api/user/my_courses
///
/// A currently-valid VIP sees the whole catalog; everyone else sees the
/// courses they have been granted membership of.
pub async fn list_my_courses(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<Course>> {
    let profile = db::profiles::get_profile(&state.pool, identity.user_id)
        .await
        .map_err(internal)?
        .unwrap_or_default();

    let courses = if profile.is_vip_valid(shared::util::now_millis()) {
        db::courses::list_courses(&state.pool, None)
            .await
            .map_err(internal)?
    } else {
        db::courses::list_owned_courses(&state.pool, identity.user_id)
            .await
            .map_err(internal)?
    };

    Ok(Json(courses))
}

/// POST /api/user/grant_vip (admin)
#[derive(Deserialize)]
pub struct GrantVipRequest {
    pub user_id: i64,
    /// Defaults to one year
    pub duration_days: Option<i64>,
}

#[derive(Serialize)]
pub struct GrantVipResponse {
    pub user_id: i64,
    pub role: Role,
    pub vip_expiry_date: Option<i64>,
}

const DEFAULT_VIP_DAYS: i64 = 365;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub async fn grant_vip(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<GrantVipRequest>,
) -> ApiResult<GrantVipResponse> {
    require_admin(&state, &identity).await?;

    let duration_days = req.duration_days.unwrap_or(DEFAULT_VIP_DAYS);
    if duration_days <= 0 {
        return Err(AppError::validation("duration_days must be positive"));
    }

    if db::users::find_by_id(&state.pool, req.user_id)
        .await
        .map_err(internal)?
        .is_none()
    {
        return Err(AppError::new(ErrorCode::UserNotFound));
    }

    let now = shared::util::now_millis();
    let profile = db::profiles::grant_vip(&state.pool, req.user_id, duration_days * DAY_MS, now)
        .await
        .map_err(internal)?;

    Ok(Json(GrantVipResponse {
        user_id: req.user_id,
        role: profile.role,
        vip_expiry_date: profile.vip_expiry_date,
    }))
}
