use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
    traits::CheckoutDbError,
};

/// Inserts a new order in `pending` status using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, CheckoutDbError> {
    if fetch_order_by_order_id(&order.order_id, conn).await?.is_some() {
        return Err(CheckoutDbError::OrderAlreadyExists(order.order_id));
    }
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                user_id,
                status,
                total_amount,
                address_id,
                transaction_id,
                mobile_number,
                expires_at
            ) VALUES ($1, $2, 'pending', $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.user_id)
    .bind(order.total_amount)
    .bind(order.address_id)
    .bind(order.transaction_id)
    .bind(order.mobile_number)
    .bind(order.expires_at)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    debug!("🗃️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_all(conn).await?.pop();
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_all(conn).await?.pop();
    Ok(order)
}

/// Returns all orders for the user, most recent first.
pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in ascending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_id) = query.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id.0);
    }
    if let Some(user_id) = query.user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(user_id);
    }
    if let Some(statuses) = query.status.filter(|s| !s.is_empty()) {
        // Statuses come from a closed enum, so they can be inlined safely
        let status_clause = statuses.iter().map(|s| format!("'{}'", s.as_str())).collect::<Vec<_>>().join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    if let Some(since) = query.since {
        where_clause.push("unixepoch(created_at) >= ");
        where_clause.push_bind_unseparated(since.timestamp());
    }
    if let Some(until) = query.until {
        where_clause.push("unixepoch(created_at) <= ");
        where_clause.push_bind_unseparated(until.timestamp());
    }
    builder.push(" ORDER BY created_at ASC, id ASC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}

/// Moves the order from `pending` to `processing` and records the payment method, but only if it is still pending.
///
/// Returns the number of rows affected, which is 1 for the caller that won, and 0 for everyone else.
pub(crate) async fn mark_as_processing(
    id: i64,
    payment_method: &str,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'processing', payment_method = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 \
         AND status = 'pending'",
    )
    .bind(payment_method)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Sets the order status to `new_status` if, and only if, it is currently `old_status`.
pub(crate) async fn update_order_status(
    order_id: &OrderId,
    old_status: OrderStatusType,
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND status = $3 RETURNING *",
    )
    .bind(new_status)
    .bind(order_id.as_str())
    .bind(old_status)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(result)
}

/// Cancels all pending orders whose `expires_at` is at or before `now`, in a single statement.
pub(crate) async fn expire_orders(now: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let rows = sqlx::query_as(
        "UPDATE orders SET updated_at = CURRENT_TIMESTAMP, status = 'cancelled' WHERE status = 'pending' AND \
         unixepoch(expires_at) <= $1 RETURNING *;",
    )
    .bind(now.timestamp())
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
