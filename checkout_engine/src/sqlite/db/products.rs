use sqlx::SqliteConnection;

use crate::db_types::{Money, Product};

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_all(conn).await?.pop();
    Ok(product)
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY id").fetch_all(conn).await?;
    Ok(products)
}

pub async fn insert_product(name: &str, price: Money, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as("INSERT INTO products (name, price) VALUES ($1, $2) RETURNING *")
        .bind(name)
        .bind(price)
        .fetch_all(conn)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(product)
}

pub async fn update_product(
    product_id: i64,
    name: &str,
    price: Money,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(
        "UPDATE products SET name = $1, price = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3 RETURNING *",
    )
    .bind(name)
    .bind(price)
    .bind(product_id)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(product)
}
