use serde::{Deserialize, Serialize};

use crate::db_types::{Address, Order, OrderItem, OrderStatusType, User};

/// Published once, by the verification call that moved an order from `pending` to `processing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFinalizedEvent {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub address: Option<Address>,
    /// The recipient of the confirmation e-mail. `None` if the user record could not be loaded.
    pub user: Option<User>,
}

impl OrderFinalizedEvent {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self { order, items, address: None, user: None }
    }

    pub fn with_address(mut self, address: Option<Address>) -> Self {
        self.address = address;
        self
    }

    pub fn with_user(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }
}

/// Published when an order is cancelled, by an admin or by the expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAnnulledEvent {
    pub order: Order,
    pub status: OrderStatusType,
}

impl OrderAnnulledEvent {
    pub fn new(order: Order) -> Self {
        let status = order.status;
        Self { order, status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderFinalized(OrderFinalizedEvent),
    OrderAnnulled(OrderAnnulledEvent),
}
