//! Read access to orders, for customers and admins.
use std::fmt::Debug;

use log::trace;

use crate::{
    checkout_api::{
        errors::OrderApiError,
        order_objects::{OrderDetails, OrderQueryFilter},
    },
    db_types::{Order, OrderId},
    traits::OrderManagement,
};

pub struct OrderApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi ({:?})", self.db)
    }
}

impl<B> OrderApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderApiError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        trace!("📦️ User #{user_id} has {} orders", orders.len());
        Ok(orders)
    }

    /// Fetches an order and its line items.
    ///
    /// When `viewer` is given, only that user's orders are visible. Someone else's order is reported as not found,
    /// so that order ids cannot be probed.
    pub async fn order_details(&self, order_id: &OrderId, viewer: Option<i64>) -> Result<OrderDetails, OrderApiError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .filter(|o| viewer.map(|uid| uid == o.user_id).unwrap_or(true))
            .ok_or_else(|| OrderApiError::OrderNotFound(order_id.clone()))?;
        let items = self.db.fetch_order_items(order.id).await?;
        Ok(OrderDetails { order, items })
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderApiError> {
        trace!("📦️ Searching orders. {query}");
        let orders = self.db.search_orders(query).await?;
        Ok(orders)
    }
}
