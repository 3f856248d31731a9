use crate::{
    db_types::{Order, OrderId, OrderItem, PendingOrderItem},
    order_objects::OrderQueryFilter,
    traits::CheckoutDbError,
};

/// Read access to orders and their line items.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutDbError>;

    /// All of the user's orders, most recent first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, CheckoutDbError>;

    /// The materialized line items for the order with internal id `order_id`.
    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, CheckoutDbError>;

    /// The item snapshot taken when the order with internal id `order_id` was created.
    async fn fetch_pending_order_items(&self, order_id: i64) -> Result<Vec<PendingOrderItem>, CheckoutDbError>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, CheckoutDbError>;
}
