//! Order database operations
//!
//! Row-level reads and writes only; lifecycle rules live in the order
//! engine (`crate::orders`), which drives `lock_by_order_number` and
//! `update_status` inside one transaction.

use rust_decimal::Decimal;
use shared::models::order::{Order, OrderStatus, PaymentMethod};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: i64,
    course_id: i64,
    price: Decimal,
    status: String,
    payment_method: Option<String>,
    note: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl OrderRow {
    fn into_order(self) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            user_id: self.user_id,
            course_id: self.course_id,
            price: self.price,
            // The status column carries a CHECK constraint; anything else
            // cannot be stored.
            status: OrderStatus::parse(&self.status).unwrap_or_default(),
            payment_method: self.payment_method.as_deref().and_then(PaymentMethod::parse),
            note: self.note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, course_id, price, status, \
                             payment_method, note, created_at, updated_at";

pub async fn insert(pool: &PgPool, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (id, order_number, user_id, course_id, price, status,
                             payment_method, note, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.user_id)
    .bind(order.course_id)
    .bind(order.price)
    .bind(order.status.as_str())
    .bind(order.payment_method.map(|m| m.as_str()))
    .bind(&order.note)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_order_number(
    pool: &PgPool,
    order_number: &str,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> =
        sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"))
            .bind(order_number)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(OrderRow::into_order))
}

/// The user's open unpaid order for a course, if any (idempotent-create guard)
pub async fn find_unpaid_for_course(
    pool: &PgPool,
    user_id: i64,
    course_id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders
         WHERE user_id = $1 AND course_id = $2 AND status = 'unpaid'"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(OrderRow::into_order))
}

pub async fn has_paid_order(
    pool: &PgPool,
    user_id: i64,
    course_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM orders
         WHERE user_id = $1 AND course_id = $2 AND status = 'paid')",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Order>, sqlx::Error> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(OrderRow::into_order).collect())
}

/// Read the order under a row lock, inside the caller's transaction.
///
/// Validation against the locked status is what protects concurrent
/// transitions from acting on a stale read.
pub async fn lock_by_order_number(
    conn: &mut sqlx::PgConnection,
    order_number: &str,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1 FOR UPDATE"
    ))
    .bind(order_number)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(OrderRow::into_order))
}

/// Persist a status change inside the caller's transaction. The payment
/// method is only overwritten when a new one is supplied.
pub async fn update_status(
    conn: &mut sqlx::PgConnection,
    order_id: i64,
    status: OrderStatus,
    payment_method: Option<PaymentMethod>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE orders
         SET status = $1, payment_method = COALESCE($2, payment_method), updated_at = $3
         WHERE id = $4",
    )
    .bind(status.as_str())
    .bind(payment_method.map(|m| m.as_str()))
    .bind(now)
    .bind(order_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
