//! Order Model and status state machine
//!
//! Lifecycle: `pending → shipping → delivered` with a side branch
//! `* → cancelled`. `delivered` and `cancelled` are terminal. Transition
//! authorization lives here, next to the data it guards; the repository
//! applies authorized transitions atomically (compare-and-swap on the
//! previous status plus stock restoration in the same transaction).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use thiserror::Error;

use super::account::Role;

// =============================================================================
// Status state machine
// =============================================================================

/// Order status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipping => "shipping",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "shipping" => Some(OrderStatus::Shipping),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The forward edges of the lifecycle graph
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (
                OrderStatus::Pending,
                OrderStatus::Shipping | OrderStatus::Delivered | OrderStatus::Cancelled
            ) | (
                OrderStatus::Shipping,
                OrderStatus::Delivered | OrderStatus::Cancelled
            )
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is asking for a transition, relative to the order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    OwningBuyer,
    OwningSeller,
    Other,
}

/// Rejected transition requests
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("order is already {0}, no further changes allowed")]
    Terminal(OrderStatus),

    #[error("cannot move order from {from} to {to}")]
    InvalidTarget { from: OrderStatus, to: OrderStatus },

    #[error("buyers may only cancel an order while it is still pending")]
    BuyerRestriction,

    #[error("not authorized to modify this order")]
    NotAuthorized,
}

/// Decide whether `requester` may move an order from `current` to `requested`.
///
/// Rules:
/// - terminal states are immutable for everyone;
/// - the owning seller may take any forward edge;
/// - the owning buyer may only request `cancelled`, and only from `pending`;
/// - anyone else is rejected outright.
pub fn authorize_transition(
    current: OrderStatus,
    requested: OrderStatus,
    requester: Requester,
) -> Result<(), TransitionError> {
    if requester == Requester::Other {
        return Err(TransitionError::NotAuthorized);
    }

    if current.is_terminal() {
        return Err(TransitionError::Terminal(current));
    }

    if !current.can_transition_to(requested) {
        return Err(TransitionError::InvalidTarget {
            from: current,
            to: requested,
        });
    }

    if requester == Requester::OwningBuyer
        && !(current == OrderStatus::Pending && requested == OrderStatus::Cancelled)
    {
        return Err(TransitionError::BuyerRestriction);
    }

    Ok(())
}

// =============================================================================
// Order entity
// =============================================================================

/// One line item: product reference plus quantity, with the unit price
/// frozen at order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: RecordId,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Order entity
///
/// `seller` is denormalized from the line items: mixed-seller carts are
/// rejected at creation, so every line belongs to this one seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub buyer: RecordId,
    pub seller: RecordId,
    pub lines: Vec<OrderLine>,
    /// Sum of unit_price * quantity, frozen at creation
    pub total_price: f64,
    #[serde(default)]
    pub comment: String,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Classify a requester relative to this order
    pub fn requester_for(&self, account_id: &RecordId, role: Role) -> Requester {
        match role {
            Role::Buyer if &self.buyer == account_id => Requester::OwningBuyer,
            Role::Seller if &self.seller == account_id => Requester::OwningSeller,
            _ => Requester::Other,
        }
    }
}

// =============================================================================
// API request / response types
// =============================================================================

/// One cart entry in a purchase request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Purchase request body: `{"products": [{"productId": ..., "quantity": ...}]}`
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreateRequest {
    pub products: Vec<OrderLineRequest>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Status transition request body
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusRequest {
    pub status: String,
}

/// Line item view
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineView {
    pub product: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Order view returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: String,
    pub buyer: String,
    pub seller: String,
    pub lines: Vec<OrderLineView>,
    pub total_price: f64,
    pub comment: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderView {
    fn from(o: Order) -> Self {
        Self {
            id: o.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            buyer: o.buyer.to_string(),
            seller: o.seller.to_string(),
            lines: o
                .lines
                .into_iter()
                .map(|l| OrderLineView {
                    product: l.product.to_string(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
            total_price: o.total_price,
            comment: o.comment,
            status: o.status,
            created_at: o.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_immutable() {
        for requester in [Requester::OwningBuyer, Requester::OwningSeller] {
            for target in [
                OrderStatus::Pending,
                OrderStatus::Shipping,
                OrderStatus::Delivered,
                OrderStatus::Cancelled,
            ] {
                assert_eq!(
                    authorize_transition(OrderStatus::Delivered, target, requester),
                    Err(TransitionError::Terminal(OrderStatus::Delivered))
                );
                assert_eq!(
                    authorize_transition(OrderStatus::Cancelled, target, requester),
                    Err(TransitionError::Terminal(OrderStatus::Cancelled))
                );
            }
        }
    }

    #[test]
    fn seller_takes_forward_edges() {
        let seller = Requester::OwningSeller;
        assert!(authorize_transition(OrderStatus::Pending, OrderStatus::Shipping, seller).is_ok());
        assert!(authorize_transition(OrderStatus::Pending, OrderStatus::Delivered, seller).is_ok());
        assert!(authorize_transition(OrderStatus::Pending, OrderStatus::Cancelled, seller).is_ok());
        assert!(authorize_transition(OrderStatus::Shipping, OrderStatus::Delivered, seller).is_ok());
        assert!(authorize_transition(OrderStatus::Shipping, OrderStatus::Cancelled, seller).is_ok());
        // No going backwards
        assert_eq!(
            authorize_transition(OrderStatus::Shipping, OrderStatus::Pending, seller),
            Err(TransitionError::InvalidTarget {
                from: OrderStatus::Shipping,
                to: OrderStatus::Pending
            })
        );
    }

    #[test]
    fn buyer_may_only_cancel_pending() {
        let buyer = Requester::OwningBuyer;
        assert!(authorize_transition(OrderStatus::Pending, OrderStatus::Cancelled, buyer).is_ok());
        assert_eq!(
            authorize_transition(OrderStatus::Shipping, OrderStatus::Cancelled, buyer),
            Err(TransitionError::BuyerRestriction)
        );
        assert_eq!(
            authorize_transition(OrderStatus::Pending, OrderStatus::Shipping, buyer),
            Err(TransitionError::BuyerRestriction)
        );
    }

    #[test]
    fn strangers_are_rejected_first() {
        assert_eq!(
            authorize_transition(OrderStatus::Pending, OrderStatus::Cancelled, Requester::Other),
            Err(TransitionError::NotAuthorized)
        );
        // Even on terminal orders the answer is authorization, not state
        assert_eq!(
            authorize_transition(OrderStatus::Delivered, OrderStatus::Shipping, Requester::Other),
            Err(TransitionError::NotAuthorized)
        );
    }

    #[test]
    fn status_round_trips_through_strings() {
        for s in [
            OrderStatus::Pending,
            OrderStatus::Shipping,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
