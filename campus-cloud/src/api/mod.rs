//! API routes for campus-cloud

pub mod account;
pub mod auth;
pub mod courses;
pub mod health;
pub mod orders;
pub mod search;

use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::error::{AppError, ErrorCode};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{UserIdentity, optional_user_auth_middleware, user_auth_middleware};
use crate::orders::Actor;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

pub(crate) fn internal(e: impl std::fmt::Display) -> AppError {
    tracing::error!("Database query error: {e}");
    AppError::new(ErrorCode::InternalError)
}

/// Resolve the acting user's role fresh from the store — roles are never
/// trusted from the token.
pub async fn load_actor(state: &AppState, identity: &UserIdentity) -> Result<Actor, AppError> {
    let profile = crate::db::profiles::get_profile(&state.pool, identity.user_id)
        .await
        .map_err(internal)?
        .unwrap_or_default();
    Ok(Actor {
        user_id: identity.user_id,
        role: profile.role,
    })
}

/// Verify that the acting user holds the admin role.
pub async fn require_admin(state: &AppState, identity: &UserIdentity) -> Result<(), AppError> {
    let actor = load_actor(state, identity).await?;
    if !actor.role.is_admin() {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(())
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth)
    let public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/search", get(search::search));

    // Catalog: anonymous allowed, identity attached when a token is present
    let catalog = Router::new()
        .route("/api/course/courses", get(courses::list_courses))
        .route("/api/course/courses/{course_id}", get(courses::get_course))
        .route(
            "/api/course/courses/{course_id}/lessons",
            get(courses::list_lessons),
        )
        .route("/api/course/lessons/{lesson_id}", get(courses::get_lesson))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_user_auth_middleware,
        ));

    // Authenticated routes (JWT required)
    let authed = Router::new()
        .route("/api/auth/change_password", post(auth::change_password))
        .route("/api/user/me", get(account::get_me))
        .route("/api/user/update_profile", post(account::update_profile))
        .route("/api/user/orders", get(account::list_my_orders))
        .route("/api/user/my_courses", get(account::list_my_courses))
        .route("/api/user/grant_vip", post(account::grant_vip))
        .route("/api/order/create", post(orders::create_order))
        .route("/api/order/confirm", post(orders::confirm_order))
        .route("/api/order/cancel", post(orders::cancel_order))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(catalog)
        .merge(authed)
        // CORS - handle cross-origin requests from the web frontend
        .layer(CorsLayer::permissive())
        // Trace - request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
