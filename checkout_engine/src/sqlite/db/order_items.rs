use sqlx::SqliteConnection;

use crate::db_types::{CartLine, NewOrderItem, OrderItem, PendingOrderItem};

/// Snapshots the given cart lines, with the prices being charged, as the pending items for the order with internal id
/// `order_id`.
pub async fn insert_pending_items(
    order_id: i64,
    lines: &[CartLine],
    conn: &mut SqliteConnection,
) -> Result<Vec<PendingOrderItem>, sqlx::Error> {
    let mut result = Vec::with_capacity(lines.len());
    for line in lines {
        let item: PendingOrderItem = sqlx::query_as(
            r#"
            INSERT INTO pending_order_items (order_id, cart_item_id, product_id, color, quantity, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
            "#,
        )
        .bind(order_id)
        .bind(line.cart_item_id)
        .bind(line.product_id)
        .bind(&line.color)
        .bind(line.quantity)
        .bind(line.price)
        .fetch_all(&mut *conn)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
        result.push(item);
    }
    Ok(result)
}

pub async fn fetch_pending_items(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<PendingOrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM pending_order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Writes one `order_items` row per item for the order with internal id `order_id`.
pub async fn insert_order_items(
    order_id: i64,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        let row: OrderItem = sqlx::query_as(
            r#"
            INSERT INTO order_items (order_id, product_id, color, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
            "#,
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(&item.color)
        .bind(item.quantity)
        .bind(item.price)
        .fetch_all(&mut *conn)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
        result.push(row);
    }
    Ok(result)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}
