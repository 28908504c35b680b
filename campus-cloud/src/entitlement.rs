//! Entitlement resolution for gated course content
//!
//! Decides whether a viewer may see a lesson or a course's lesson list.
//! The decision core is pure over a loaded [`ViewerEntitlements`] snapshot;
//! the async wrappers fetch the profile and paid-order record per call, so
//! VIP expiry is always evaluated against the clock at request time.

use sqlx::PgPool;

use shared::models::course::Course;
use shared::models::lesson::Lesson;
use shared::models::profile::UserProfile;

use crate::db;

/// Everything the policy needs to know about an authenticated viewer
#[derive(Debug, Clone, Default)]
pub struct ViewerEntitlements {
    pub profile: UserProfile,
    /// A `paid` order exists for (viewer, course)
    pub has_paid_order: bool,
}

/// Course-level gate: who may see the lesson list.
///
/// Free courses are open to everyone, anonymous included. Priced courses
/// require a currently-valid VIP or a paid order.
pub fn course_access(course_price: i32, viewer: Option<&ViewerEntitlements>, now: i64) -> bool {
    if course_price == 0 {
        return true;
    }
    let Some(viewer) = viewer else {
        return false;
    };
    viewer.profile.is_vip_valid(now) || viewer.has_paid_order
}

/// Lesson-level gate: free-preview lessons are open unconditionally,
/// everything else follows the course-level policy.
pub fn lesson_access(
    free_preview: bool,
    course_price: i32,
    viewer: Option<&ViewerEntitlements>,
    now: i64,
) -> bool {
    free_preview || course_access(course_price, viewer, now)
}

/// Load the viewer's profile and paid-order record for a course.
///
/// A missing profile row resolves to the default (regular) profile.
pub async fn load_viewer(
    pool: &PgPool,
    user_id: i64,
    course_id: i64,
) -> Result<ViewerEntitlements, sqlx::Error> {
    let profile = db::profiles::get_profile(pool, user_id)
        .await?
        .unwrap_or_default();
    let has_paid_order = db::orders::has_paid_order(pool, user_id, course_id).await?;
    Ok(ViewerEntitlements {
        profile,
        has_paid_order,
    })
}

/// May `viewer_id` (None = anonymous) view this lesson?
pub async fn can_access_lesson(
    pool: &PgPool,
    viewer_id: Option<i64>,
    lesson: &Lesson,
    course: &Course,
    now: i64,
) -> Result<bool, sqlx::Error> {
    // Open content short-circuits before any store read
    if lesson.free_preview || course.is_free() {
        return Ok(true);
    }
    let Some(user_id) = viewer_id else {
        return Ok(false);
    };
    let viewer = load_viewer(pool, user_id, course.id).await?;
    Ok(lesson_access(
        lesson.free_preview,
        course.price,
        Some(&viewer),
        now,
    ))
}

/// May `viewer_id` (None = anonymous) view this course's lesson list?
pub async fn can_access_course_lessons(
    pool: &PgPool,
    viewer_id: Option<i64>,
    course: &Course,
    now: i64,
) -> Result<bool, sqlx::Error> {
    if course.is_free() {
        return Ok(true);
    }
    let Some(user_id) = viewer_id else {
        return Ok(false);
    };
    let viewer = load_viewer(pool, user_id, course.id).await?;
    Ok(course_access(course.price, Some(&viewer), now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::profile::Role;

    const NOW: i64 = 1_700_000_000_000;

    fn regular() -> ViewerEntitlements {
        ViewerEntitlements::default()
    }

    fn buyer() -> ViewerEntitlements {
        ViewerEntitlements {
            profile: UserProfile::default(),
            has_paid_order: true,
        }
    }

    fn vip(expiry: i64) -> ViewerEntitlements {
        ViewerEntitlements {
            profile: UserProfile {
                role: Role::Vip,
                vip_expiry_date: Some(expiry),
                avatar: None,
            },
            has_paid_order: false,
        }
    }

    #[test]
    fn test_free_preview_open_to_anonymous() {
        assert!(lesson_access(true, 100, None, NOW));
    }

    #[test]
    fn test_free_course_open_to_anonymous() {
        assert!(lesson_access(false, 0, None, NOW));
        assert!(course_access(0, None, NOW));
    }

    #[test]
    fn test_priced_lesson_denied_to_anonymous() {
        assert!(!lesson_access(false, 100, None, NOW));
        assert!(!course_access(100, None, NOW));
    }

    #[test]
    fn test_priced_lesson_denied_to_regular_non_buyer() {
        assert!(!lesson_access(false, 100, Some(&regular()), NOW));
    }

    #[test]
    fn test_paid_order_grants_access() {
        assert!(lesson_access(false, 100, Some(&buyer()), NOW));
        assert!(course_access(100, Some(&buyer()), NOW));
    }

    #[test]
    fn test_valid_vip_grants_access() {
        assert!(lesson_access(false, 100, Some(&vip(NOW + 1)), NOW));
    }

    #[test]
    fn test_expired_vip_denied_without_profile_write() {
        // Same stored profile, later clock: access flips to denied
        let viewer = vip(NOW + 60_000);
        assert!(lesson_access(false, 100, Some(&viewer), NOW));
        assert!(!lesson_access(false, 100, Some(&viewer), NOW + 60_000));
        assert!(!lesson_access(false, 100, Some(&viewer), NOW + 60_001));
    }

    #[test]
    fn test_vip_expiry_does_not_bypass_preview_rules() {
        // An expired VIP still sees free previews and free courses
        let viewer = vip(NOW - 1);
        assert!(lesson_access(true, 100, Some(&viewer), NOW));
        assert!(lesson_access(false, 0, Some(&viewer), NOW));
        assert!(!lesson_access(false, 100, Some(&viewer), NOW));
    }
}
