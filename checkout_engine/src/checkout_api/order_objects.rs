use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    checkout_api::pricing::PriceBreakdown,
    db_types::{Address, CartLine, Order, OrderId, OrderItem, OrderStatusType},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub order_id: Option<OrderId>,
    pub user_id: Option<i64>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub status: Option<Vec<OrderStatusType>>,
}

impl OrderQueryFilter {
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() &&
            self.user_id.is_none() &&
            self.status.as_ref().map(|s| s.is_empty()).unwrap_or(true) &&
            self.since.is_none() &&
            self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No filters.");
        }
        if let Some(order_id) = &self.order_id {
            write!(f, "order_id: {order_id}. ")?;
        }
        if let Some(user_id) = &self.user_id {
            write!(f, "user_id: {user_id}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since: {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until: {until}. ")?;
        }
        if let Some(status) = self.status.as_ref().filter(|s| !s.is_empty()) {
            let statuses = status.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(",");
            write!(f, "status: {statuses}. ")?;
        }
        Ok(())
    }
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// What the customer submits to start a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// The total the customer was shown, in rupees. It must match the server's own calculation to the paisa.
    pub amount: Decimal,
    pub address_id: i64,
    pub mobile_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitiatedPayment {
    pub order_id: OrderId,
    pub redirect_url: String,
}

/// A user's cart with its price breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub pricing: PriceBreakdown,
}

/// Everything the confirmation e-mail needs to know about a freshly finalized order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinalizedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub address: Option<Address>,
}

/// The result of handling a payment verification callback. Every variant maps onto a browser redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// This callback finalized the order.
    Finalized(OrderId),
    /// The order had already been finalized by an earlier callback. Treated as success, with no side effects.
    AlreadyFinalized(OrderId),
    Failed { order_id: Option<OrderId>, reason: VerificationFailure },
}

impl VerificationOutcome {
    pub fn failed(order_id: Option<OrderId>, reason: VerificationFailure) -> Self {
        Self::Failed { order_id, reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Finalized(_) | Self::AlreadyFinalized(_))
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            Self::Finalized(oid) | Self::AlreadyFinalized(oid) => Some(oid),
            Self::Failed { order_id, .. } => order_id.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    MissingParameters,
    /// The provider did not confirm the payment, could not be reached, or reported a different amount.
    ProviderStatusFailure(String),
    OrderNotFound,
    OrderCancelled,
    EmptyCart,
    /// Finalization failed for a reason outside the customer's control, e.g. the database was unavailable.
    Internal(String),
}

impl Display for VerificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParameters => write!(f, "Missing orderId or transactionId"),
            Self::ProviderStatusFailure(code) => write!(f, "Payment was not successful ({code})"),
            Self::OrderNotFound => write!(f, "Order not found"),
            Self::OrderCancelled => write!(f, "This order has been cancelled"),
            Self::EmptyCart => write!(f, "There were no items to order"),
            Self::Internal(_) => write!(f, "We could not complete your order. Please contact support"),
        }
    }
}
