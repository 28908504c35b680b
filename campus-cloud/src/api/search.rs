//! Global substring search over courses and users
//!
//! Plain ILIKE matching, no ranking or index.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::db;
use crate::state::AppState;

use super::{ApiResult, internal};

const DEFAULT_LIMIT: i64 = 5;
const MAX_LIMIT: i64 = 20;

/// GET /api/search?q=&limit=
#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: i64,
    pub title: String,
    pub description: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<SearchResult>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(AppError::validation("search query is required"));
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let mut results = Vec::new();

    for course in db::courses::search(&state.pool, q, limit)
        .await
        .map_err(internal)?
    {
        results.push(SearchResult {
            kind: "course",
            id: course.id,
            title: course.title,
            description: course.description,
        });
    }

    for user in db::users::search(&state.pool, q, limit)
        .await
        .map_err(internal)?
    {
        let full_name = format!("{} {}", user.first_name, user.last_name);
        results.push(SearchResult {
            kind: "user",
            id: user.id,
            title: user.username,
            description: full_name.trim().to_string(),
        });
    }

    Ok(Json(results))
}
