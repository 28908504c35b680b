//! Order engine — creation, confirmation, cancellation, and the atomic
//! status transition
//!
//! Course membership is granted and revoked exclusively here, as an
//! explicit step inside [`transition`]'s transaction. There is no save-hook
//! or observer firing on unrelated writes: an order row changes status and
//! the membership set changes with it, atomically, or neither does.

use rust_decimal::Decimal;
use sqlx::PgPool;

use shared::error::{AppError, ErrorCode};
use shared::models::order::{
    Order, OrderStatus, PaymentMethod, TransitionError, validate_transition,
};
use shared::models::profile::Role;
use shared::util::{now_millis, order_number_candidate, snowflake_id};

use crate::db;
use crate::error::{ServiceError, ServiceResult};

/// Acting user context. Callers resolve the role fresh from the store per
/// request; the engine never consults ambient session state.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

/// Outcome of [`create_order`]
#[derive(Debug)]
pub enum CreateOrderOutcome {
    /// A new unpaid order was inserted
    Created(Order),
    /// The user already holds an unpaid order for this course; no new row
    Existing(Order),
}

impl CreateOrderOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Created(order) | Self::Existing(order) => order,
        }
    }
}

const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Create an unpaid order for a course, snapshotting its current price.
///
/// Calling this twice before confirmation returns the same order number
/// both times — the existing unpaid order is handed back instead of a
/// duplicate row.
pub async fn create_order(
    pool: &PgPool,
    user_id: i64,
    course_id: i64,
    note: Option<String>,
) -> ServiceResult<CreateOrderOutcome> {
    let course = db::courses::get_course(pool, course_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CourseNotFound))?;

    if db::courses::is_member(pool, course_id, user_id).await? {
        return Err(AppError::new(ErrorCode::CourseAlreadyOwned).into());
    }

    if let Some(existing) = db::orders::find_unpaid_for_course(pool, user_id, course_id).await? {
        return Ok(CreateOrderOutcome::Existing(existing));
    }

    let now = now_millis();
    let mut order = Order {
        id: snowflake_id(),
        order_number: order_number_candidate(),
        user_id,
        course_id,
        price: Decimal::from(course.price),
        status: OrderStatus::Unpaid,
        payment_method: None,
        note,
        created_at: now,
        updated_at: now,
    };

    // Candidates are timestamp+random and can collide; the UNIQUE column is
    // the arbiter. Regenerate and retry, bounded.
    for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
        match db::orders::insert(pool, &order).await {
            Ok(()) => return Ok(CreateOrderOutcome::Created(order)),
            Err(e) if db::violated_constraint(&e) == Some("orders_unpaid_once_idx") => {
                // Lost a concurrent create for the same (user, course);
                // hand back the winner's order.
                let existing = db::orders::find_unpaid_for_course(pool, user_id, course_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::internal("unpaid order disappeared after insert conflict")
                    })?;
                return Ok(CreateOrderOutcome::Existing(existing));
            }
            Err(e) if db::is_unique_violation(&e) => {
                tracing::warn!(
                    attempt,
                    order_number = %order.order_number,
                    "order number collision, regenerating"
                );
                order.id = snowflake_id();
                order.order_number = order_number_candidate();
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::internal("could not allocate a unique order number").into())
}

/// Confirm payment of an unpaid order (admin only), granting course
/// membership.
///
/// Only orders whose status is exactly `unpaid` are confirmable; the check
/// is re-run against the locked row inside [`transition`], so of two
/// concurrent confirmations exactly one succeeds and the other fails with
/// `InvalidTransition`.
pub async fn confirm_order(
    pool: &PgPool,
    actor: &Actor,
    order_number: &str,
    payment_method: PaymentMethod,
) -> ServiceResult<Order> {
    if !actor.role.is_admin() {
        return Err(AppError::new(ErrorCode::AdminRequired).into());
    }

    transition(
        pool,
        order_number,
        OrderStatus::Paid,
        Some(payment_method),
        Some(OrderStatus::Unpaid),
    )
    .await
}

/// Cancel an open order. Allowed for the order's owner or an admin;
/// terminal orders are rejected by the state machine.
pub async fn cancel_order(
    pool: &PgPool,
    actor: &Actor,
    order_number: &str,
) -> ServiceResult<Order> {
    let order = db::orders::find_by_order_number(pool, order_number)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if order.user_id != actor.user_id && !actor.role.is_admin() {
        return Err(AppError::permission_denied(
            "Only the order owner or an administrator can cancel an order",
        )
        .into());
    }

    transition(pool, order_number, OrderStatus::Cancelled, None, None).await
}

/// Atomically transition an order, firing the membership side effect.
///
/// The row is re-read under a row lock and every rule is checked against
/// that fresh read — never against whatever the caller observed earlier.
/// The status write and the membership mutation commit together or not at
/// all. A same-status target commits nothing and does not fire the side
/// effect.
///
/// `expected_from` narrows the admitted prior state beyond the state
/// machine (confirmation requires exactly `unpaid`).
pub async fn transition(
    pool: &PgPool,
    order_number: &str,
    to: OrderStatus,
    payment_method: Option<PaymentMethod>,
    expected_from: Option<OrderStatus>,
) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let order = db::orders::lock_by_order_number(&mut tx, order_number)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    let from = order.status;

    if let Some(expected) = expected_from
        && from != expected
    {
        return Err(invalid_transition(from, to).into());
    }

    if from == to {
        // No status change: nothing to persist, side effect must not fire
        tx.commit().await?;
        return Ok(order);
    }

    let effective_method = payment_method.or(order.payment_method);
    validate_transition(from, to, effective_method)
        .map_err(|e| ServiceError::App(transition_error(e)))?;

    let now = now_millis();
    db::orders::update_status(&mut tx, order.id, to, payment_method, now).await?;

    // Membership side effect, same atomic unit as the status write: into
    // `paid` grants, away from it revokes (a no-op for non-members).
    if to == OrderStatus::Paid {
        db::courses::add_member(&mut tx, order.course_id, order.user_id, now).await?;
    } else {
        db::courses::remove_member(&mut tx, order.course_id, order.user_id).await?;
    }

    tx.commit().await?;

    Ok(Order {
        status: to,
        payment_method: effective_method,
        updated_at: now,
        ..order
    })
}

fn invalid_transition(from: OrderStatus, to: OrderStatus) -> AppError {
    transition_error(TransitionError::Invalid { from, to })
}

fn transition_error(e: TransitionError) -> AppError {
    let code = match e {
        TransitionError::Invalid { .. } => ErrorCode::InvalidTransition,
        TransitionError::MissingPaymentMethod => ErrorCode::PaymentMethodRequired,
    };
    AppError::with_message(code, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_transition_error_codes() {
        let err = transition_error(TransitionError::Invalid {
            from: Paid,
            to: Cancelled,
        });
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(err.message, "invalid order transition: paid -> cancelled");

        let err = transition_error(TransitionError::MissingPaymentMethod);
        assert_eq!(err.code, ErrorCode::PaymentMethodRequired);
    }

    #[test]
    fn test_invalid_transition_names_pair() {
        let err = invalid_transition(Cancelled, Paid);
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(err.message, "invalid order transition: cancelled -> paid");
    }

    #[test]
    fn test_outcome_order_accessor() {
        let order = Order {
            id: 1,
            order_number: "17000000000001".to_string(),
            user_id: 2,
            course_id: 3,
            price: Decimal::from(100),
            status: Unpaid,
            payment_method: None,
            note: None,
            created_at: 0,
            updated_at: 0,
        };
        let outcome = CreateOrderOutcome::Existing(order);
        assert_eq!(outcome.order().order_number, "17000000000001");
    }
}
