//! Order record and state machine types

use chrono::{DateTime, Utc};
use escrow_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an order.
///
/// Transitions are forward-only with no skipping:
/// `Created → Preparing → Assigned → PickedUp → Delivered`.
/// `Cancelled` is terminal and reachable only from `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OrderState {
    /// Escrowed, waiting for the restaurant
    Created = 1,
    /// Restaurant confirmed preparation
    Preparing = 2,
    /// Platform assigned a staked deliverer
    Assigned = 3,
    /// Deliverer confirmed pickup
    PickedUp = 4,
    /// Client confirmed delivery; escrow released (terminal)
    Delivered = 5,
    /// Client cancelled before preparation; escrow refunded (terminal)
    Cancelled = 6,
}

impl OrderState {
    /// Stable symbolic code for the external event log
    pub fn code(&self) -> &'static str {
        match self {
            OrderState::Created => "CREATED",
            OrderState::Preparing => "PREPARING",
            OrderState::Assigned => "ASSIGNED",
            OrderState::PickedUp => "PICKED_UP",
            OrderState::Delivered => "DELIVERED",
            OrderState::Cancelled => "CANCELLED",
        }
    }

    /// True iff `to` is the single legal next state from `self`
    pub fn can_advance_to(&self, to: OrderState) -> bool {
        matches!(
            (self, to),
            (OrderState::Created, OrderState::Preparing)
                | (OrderState::Created, OrderState::Cancelled)
                | (OrderState::Preparing, OrderState::Assigned)
                | (OrderState::Assigned, OrderState::PickedUp)
                | (OrderState::PickedUp, OrderState::Delivered)
        )
    }

    /// No further transitions leave this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Delivered | OrderState::Cancelled)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single escrowed order.
///
/// Owned exclusively by the ledger; immutable once delivered except
/// for bookkeeping timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Monotonically increasing id
    pub id: u64,

    /// Paying client (the order creator)
    pub client: Address,

    /// Receiving restaurant
    pub restaurant: Address,

    /// Assigned deliverer, set at assignment
    pub deliverer: Option<Address>,

    /// Food price (wei)
    pub food_price: Amount,

    /// Delivery fee (wei)
    pub delivery_fee: Amount,

    /// Platform fee, derived from the food price at creation (wei)
    pub platform_fee: Amount,

    /// Escrow held by the ledger: food + delivery + platform fee
    pub total_escrowed: Amount,

    /// Opaque content-addressed metadata reference
    pub metadata_uri: String,

    /// Current lifecycle state
    pub state: OrderState,

    /// Set when the escrow is released on delivery
    pub delivered: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Completion timestamp, set on delivery
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only_sequence() {
        assert!(OrderState::Created.can_advance_to(OrderState::Preparing));
        assert!(OrderState::Preparing.can_advance_to(OrderState::Assigned));
        assert!(OrderState::Assigned.can_advance_to(OrderState::PickedUp));
        assert!(OrderState::PickedUp.can_advance_to(OrderState::Delivered));
    }

    #[test]
    fn test_no_skipping_or_cycling() {
        assert!(!OrderState::Created.can_advance_to(OrderState::Assigned));
        assert!(!OrderState::Created.can_advance_to(OrderState::Delivered));
        assert!(!OrderState::Preparing.can_advance_to(OrderState::Created));
        assert!(!OrderState::Delivered.can_advance_to(OrderState::Created));
        assert!(!OrderState::PickedUp.can_advance_to(OrderState::Assigned));
    }

    #[test]
    fn test_cancel_only_from_created() {
        assert!(OrderState::Created.can_advance_to(OrderState::Cancelled));
        assert!(!OrderState::Preparing.can_advance_to(OrderState::Cancelled));
        assert!(!OrderState::Assigned.can_advance_to(OrderState::Cancelled));
        assert!(!OrderState::PickedUp.can_advance_to(OrderState::Cancelled));
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderState::Delivered.is_terminal());
        assert!(OrderState::Cancelled.is_terminal());
        assert!(!OrderState::Created.is_terminal());
        assert!(!OrderState::PickedUp.is_terminal());
    }
}
