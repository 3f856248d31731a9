use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{CartItem, CartLine, NewCartItem};

/// The user's cart rows joined with each product's current name and price.
pub async fn fetch_cart_lines(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines = sqlx::query_as(
        r#"
        SELECT
            cart_items.id as cart_item_id,
            cart_items.product_id as product_id,
            products.name as product_name,
            cart_items.color as color,
            cart_items.quantity as quantity,
            products.price as price
        FROM cart_items JOIN products ON cart_items.product_id = products.id
        WHERE cart_items.user_id = $1
        ORDER BY cart_items.id
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

/// Inserts the item, or adds its quantity to the existing row for the same user, product and colour.
pub async fn upsert_item(item: NewCartItem, conn: &mut SqliteConnection) -> Result<CartItem, sqlx::Error> {
    let row = sqlx::query_as(
        r#"
        INSERT INTO cart_items (user_id, product_id, quantity, color) VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, product_id, color) DO UPDATE SET
            quantity = quantity + excluded.quantity,
            updated_at = CURRENT_TIMESTAMP
        RETURNING *;
        "#,
    )
    .bind(item.user_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.color)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(row)
}

pub async fn update_quantity(
    user_id: i64,
    cart_item_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartItem>, sqlx::Error> {
    let row = sqlx::query_as(
        r#"
        UPDATE cart_items SET quantity = $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND user_id = $3
        RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(cart_item_id)
    .bind(user_id)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(row)
}

pub async fn remove_item(user_id: i64, cart_item_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(cart_item_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Takes each `(cart_item_id, quantity)` out of the user's cart. A row is deleted once nothing is left of it, otherwise
/// its quantity is reduced, so units merged into the row after the snapshot was taken stay in the cart. Rows that have
/// already gone are ignored. Returns the number of rows deleted.
pub async fn deduct_items(user_id: i64, items: &[(i64, i64)], conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let mut deleted = 0;
    for (cart_item_id, quantity) in items {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2 AND quantity <= $3")
            .bind(cart_item_id)
            .bind(user_id)
            .bind(quantity)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() > 0 {
            deleted += result.rows_affected();
            continue;
        }
        let result = sqlx::query(
            r#"
            UPDATE cart_items SET quantity = quantity - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(quantity)
        .bind(cart_item_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() > 0 {
            trace!("🗃️ Cart item #{cart_item_id} reduced by {quantity}");
        }
    }
    Ok(deleted)
}

pub async fn clear_cart(user_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected())
}
