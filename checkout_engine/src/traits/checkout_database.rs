use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{CartLine, NewOrder, Order, OrderId, OrderStatusType, PendingOrderItem},
    traits::{
        data_objects::{FinalizeResult, ItemSource},
        CartManagement,
        OrderManagement,
        StoreManagement,
    },
};

/// This trait defines the highest level of behaviour for backends supporting the checkout engine.
///
/// Every method here is atomic: implementations must perform all of their writes in a single database transaction.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone + CartManagement + OrderManagement + StoreManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new order in `pending` status and, in the same transaction, snapshots every given cart line (with the
    /// price being charged) into the pending items for the order.
    async fn create_pending_order(
        &self,
        order: NewOrder,
        lines: &[CartLine],
    ) -> Result<(Order, Vec<PendingOrderItem>), CheckoutDbError>;

    /// Moves the order from `pending` to `processing` and materializes its line items.
    ///
    /// The status change is a conditional update and is the first write of the transaction, so of any number of
    /// concurrent callers exactly one will see the order as pending. The others receive
    /// [`FinalizeResult::NotPending`] and nothing is written.
    ///
    /// If there are no items to materialize, the transaction is rolled back, the order stays pending and
    /// [`FinalizeResult::EmptyCart`] is returned.
    ///
    /// The ordered rows are removed from the user's cart: only the snapshotted rows for [`ItemSource::Snapshot`], the
    /// entire cart for [`ItemSource::LiveCart`].
    async fn finalize_order(
        &self,
        order: &Order,
        payment_method: &str,
        source: ItemSource,
    ) -> Result<FinalizeResult, CheckoutDbError>;

    /// Changes the order status to `new_status`, but only if it is currently `old_status`. Returns `None` if the
    /// order was not in `old_status` (it may have been changed concurrently).
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        old_status: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, CheckoutDbError>;

    /// Cancels every pending order whose `expires_at` is at or before `now`, returning the cancelled orders.
    async fn expire_orders(&self, now: DateTime<Utc>) -> Result<Vec<Order>, CheckoutDbError>;
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutDbError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("User {0} does not exist")]
    UserNotFound(i64),
    #[error("Cart item {0} does not exist")]
    CartItemNotFound(i64),
    #[error("Address {0} does not exist")]
    AddressNotFound(i64),
    #[error("Quantity must be at least 1, but was {0}")]
    InvalidQuantity(i64),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for CheckoutDbError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutDbError::DatabaseError(e.to_string())
    }
}
