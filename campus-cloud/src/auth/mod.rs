//! User JWT authentication for the public API
//!
//! The acting user is always explicit context: middleware decodes the
//! bearer token into a [`UserIdentity`] request extension, and handlers
//! that need a role read it fresh from the store. Nothing is held in
//! ambient session state.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::state::AppState;

/// JWT claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: i64,
    /// Username
    pub username: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user identity extracted from JWT
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: i64,
    pub username: String,
}

/// Viewer context for catalog routes — anonymous requests carry `None`
#[derive(Debug, Clone, Default)]
pub struct OptionalUser(pub Option<UserIdentity>);

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a user
pub fn create_token(
    user_id: i64,
    username: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id,
        username: username.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn decode_identity(token: &str, secret: &str) -> Result<UserIdentity, jsonwebtoken::errors::Error> {
    let token_data = jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(UserIdentity {
        user_id: token_data.claims.sub,
        username: token_data.claims.username,
    })
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Middleware that extracts and verifies the user JWT from the Authorization header
pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or_else(AppError::not_authenticated)?;

    let identity = decode_identity(token, &state.jwt_secret).map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        AppError::invalid_token("Invalid or expired token")
    })?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Middleware for catalog routes: attaches the identity when a valid token
/// is present and passes anonymous requests through untouched.
pub async fn optional_user_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let viewer = bearer_token(&request).and_then(|t| decode_identity(t, &state.jwt_secret).ok());
    request.extensions_mut().insert(OptionalUser(viewer));
    next.run(request).await
}
