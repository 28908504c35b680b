//! Order endpoints: create, admin confirmation, cancellation

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::models::order::{Order, OrderStatus, PaymentMethod};

use crate::auth::UserIdentity;
use crate::orders::{self, CreateOrderOutcome};
use crate::state::AppState;

use super::{ApiResult, load_actor};

/// POST /api/order/create
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub course_id: i64,
    pub note: Option<String>,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order_number: String,
    pub status: OrderStatus,
    /// False when an existing unpaid order was returned instead of a new row
    pub created: bool,
    pub message: String,
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<CreateOrderResponse> {
    let outcome =
        orders::create_order(&state.pool, identity.user_id, req.course_id, req.note).await?;

    let created = matches!(outcome, CreateOrderOutcome::Created(_));
    let message = if created {
        "Order created"
    } else {
        "You already have an unpaid order for this course"
    };
    let order = outcome.order();

    Ok(Json(CreateOrderResponse {
        order_number: order.order_number.clone(),
        status: order.status,
        created,
        message: message.to_string(),
    }))
}

/// POST /api/order/confirm (admin)
#[derive(Deserialize)]
pub struct ConfirmOrderRequest {
    pub order_number: String,
    pub payment_method: PaymentMethod,
}

pub async fn confirm_order(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<ConfirmOrderRequest>,
) -> ApiResult<Order> {
    let actor = load_actor(&state, &identity).await?;
    let order = orders::confirm_order(
        &state.pool,
        &actor,
        &req.order_number,
        req.payment_method,
    )
    .await?;
    Ok(Json(order))
}

/// POST /api/order/cancel
#[derive(Deserialize)]
pub struct CancelOrderRequest {
    pub order_number: String,
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<CancelOrderRequest>,
) -> ApiResult<Order> {
    let actor = load_actor(&state, &identity).await?;
    let order = orders::cancel_order(&state.pool, &actor, &req.order_number).await?;
    Ok(Json(order))
}
