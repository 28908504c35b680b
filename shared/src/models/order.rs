//! Order Model
//!
//! Order lifecycle:
//!
//! ```text
//! unpaid    -> pending | paid (requires payment_method) | cancelled
//! pending   -> paid (requires payment_method) | cancelled
//! paid      -> paid only (no-op)
//! cancelled -> cancelled only (no-op)
//! ```
//!
//! `paid` and `cancelled` are terminal: once reached, the stored status
//! never changes again. Course membership is granted and revoked only as a
//! side effect of a status change, inside the same atomic unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Unpaid,
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unpaid" => Some(Self::Unpaid),
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further status change.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Whether the state machine admits `self -> next`.
    ///
    /// A same-status target is always admitted as a no-op, including for
    /// terminal states.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Unpaid, Self::Pending | Self::Paid | Self::Cancelled)
                | (Self::Pending, Self::Paid | Self::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method recorded when an order is confirmed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// 手动支付
    Manual,
    /// 支付宝
    Alipay,
    /// 微信支付
    Wechat,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Alipay => "alipay",
            Self::Wechat => "wechat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "alipay" => Some(Self::Alipay),
            "wechat" => Some(Self::Wechat),
            _ => None,
        }
    }
}

/// Why a status change was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The attempted (from, to) pair is not in the state machine
    Invalid { from: OrderStatus, to: OrderStatus },
    /// Entering `paid` without a payment method
    MissingPaymentMethod,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { from, to } => {
                write!(f, "invalid order transition: {from} -> {to}")
            }
            Self::MissingPaymentMethod => {
                write!(f, "a payment method is required to mark an order paid")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Validate a status change against the order state machine.
///
/// `payment_method` is the method the order will carry after the change
/// (either newly supplied or already stored). Entering `paid` from a
/// non-paid state requires one.
pub fn validate_transition(
    from: OrderStatus,
    to: OrderStatus,
    payment_method: Option<PaymentMethod>,
) -> Result<(), TransitionError> {
    if !from.can_transition_to(to) {
        return Err(TransitionError::Invalid { from, to });
    }
    if to == OrderStatus::Paid && from != OrderStatus::Paid && payment_method.is_none() {
        return Err(TransitionError::MissingPaymentMethod);
    }
    Ok(())
}

/// Order entity
///
/// `price` is a snapshot of `course.price` taken at creation time; later
/// price changes on the course do not affect existing orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Globally unique, immutable once set
    pub order_number: String,
    pub user_id: i64,
    pub course_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub status: OrderStatus,
    pub payment_method: Option<PaymentMethod>,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [Unpaid, Pending, Paid, Cancelled] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Paid).unwrap(), "\"paid\"");
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, Cancelled);
    }

    #[test]
    fn test_terminal_states() {
        assert!(Paid.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Unpaid.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn test_transition_matrix() {
        // From unpaid
        assert!(Unpaid.can_transition_to(Pending));
        assert!(Unpaid.can_transition_to(Paid));
        assert!(Unpaid.can_transition_to(Cancelled));

        // From pending
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Unpaid));

        // Terminal states only admit themselves
        assert!(!Paid.can_transition_to(Unpaid));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Unpaid));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Paid));
    }

    #[test]
    fn test_same_status_is_noop() {
        for status in [Unpaid, Pending, Paid, Cancelled] {
            assert!(status.can_transition_to(status));
            assert_eq!(validate_transition(status, status, None), Ok(()));
        }
    }

    #[test]
    fn test_paid_requires_payment_method() {
        assert_eq!(
            validate_transition(Unpaid, Paid, None),
            Err(TransitionError::MissingPaymentMethod)
        );
        assert_eq!(
            validate_transition(Pending, Paid, None),
            Err(TransitionError::MissingPaymentMethod)
        );
        assert_eq!(
            validate_transition(Unpaid, Paid, Some(PaymentMethod::Alipay)),
            Ok(())
        );
        // Cancellation never needs a payment method
        assert_eq!(validate_transition(Unpaid, Cancelled, None), Ok(()));
    }

    #[test]
    fn test_invalid_transition_names_pair() {
        let err = validate_transition(Paid, Cancelled, None).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Invalid {
                from: Paid,
                to: Cancelled
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid order transition: paid -> cancelled"
        );
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [
            PaymentMethod::Manual,
            PaymentMethod::Alipay,
            PaymentMethod::Wechat,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("paypal"), None);
    }

    #[test]
    fn test_order_price_serializes_as_float() {
        let order = Order {
            id: 1,
            order_number: "17000000001234".to_string(),
            user_id: 2,
            course_id: 3,
            price: Decimal::from(100),
            status: Unpaid,
            payment_method: None,
            note: None,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"price\":100.0"));
        assert!(json.contains("\"status\":\"unpaid\""));
    }
}
