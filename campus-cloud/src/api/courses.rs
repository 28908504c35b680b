//! Catalog endpoints: course list/detail, entitlement-gated lesson access

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::course::Course;
use shared::models::lesson::Lesson;
use shared::models::tag::Tag;

use crate::auth::OptionalUser;
use crate::db;
use crate::entitlement;
use crate::state::AppState;

use super::{ApiResult, internal};

/// GET /api/course/courses
#[derive(Deserialize)]
pub struct CoursesQuery {
    /// Filter by tag name
    pub tag: Option<String>,
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CoursesQuery>,
) -> ApiResult<Vec<Course>> {
    let courses = db::courses::list_courses(&state.pool, query.tag.as_deref())
        .await
        .map_err(internal)?;
    Ok(Json(courses))
}

/// GET /api/course/courses/{course_id}
#[derive(Serialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: Course,
    pub tags: Vec<Tag>,
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> ApiResult<CourseDetailResponse> {
    let course = db::courses::get_course(&state.pool, course_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CourseNotFound))?;

    let tags = db::tags::list_for_course(&state.pool, course_id)
        .await
        .map_err(internal)?;

    Ok(Json(CourseDetailResponse { course, tags }))
}

fn access_denied(viewer_id: Option<i64>) -> AppError {
    match viewer_id {
        None => AppError::not_authenticated(),
        Some(_) => AppError::with_message(
            ErrorCode::CourseAccessDenied,
            "Purchase the course or upgrade to VIP to view this content",
        ),
    }
}

/// GET /api/course/courses/{course_id}/lessons
pub async fn list_lessons(
    State(state): State<AppState>,
    Extension(OptionalUser(viewer)): Extension<OptionalUser>,
    Path(course_id): Path<i64>,
) -> ApiResult<Vec<Lesson>> {
    let course = db::courses::get_course(&state.pool, course_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CourseNotFound))?;

    let viewer_id = viewer.map(|v| v.user_id);
    let now = shared::util::now_millis();
    let allowed = entitlement::can_access_course_lessons(&state.pool, viewer_id, &course, now)
        .await
        .map_err(internal)?;
    if !allowed {
        return Err(access_denied(viewer_id));
    }

    let lessons = db::lessons::list_lessons(&state.pool, course_id)
        .await
        .map_err(internal)?;
    Ok(Json(lessons))
}

/// GET /api/course/lessons/{lesson_id}
pub async fn get_lesson(
    State(state): State<AppState>,
    Extension(OptionalUser(viewer)): Extension<OptionalUser>,
    Path(lesson_id): Path<i64>,
) -> ApiResult<Lesson> {
    let lesson = db::lessons::get_lesson(&state.pool, lesson_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::LessonNotFound))?;

    let course = db::courses::get_course(&state.pool, lesson.course_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::CourseNotFound))?;

    let viewer_id = viewer.map(|v| v.user_id);
    let now = shared::util::now_millis();
    let allowed = entitlement::can_access_lesson(&state.pool, viewer_id, &lesson, &course, now)
        .await
        .map_err(internal)?;
    if !allowed {
        return Err(access_denied(viewer_id));
    }

    Ok(Json(lesson))
}
