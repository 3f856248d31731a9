use sqlx::SqliteConnection;

use crate::db_types::{Address, NewAddress};

pub async fn fetch_address(address_id: i64, conn: &mut SqliteConnection) -> Result<Option<Address>, sqlx::Error> {
    let address =
        sqlx::query_as("SELECT * FROM addresses WHERE id = $1").bind(address_id).fetch_all(conn).await?.pop();
    Ok(address)
}

pub async fn fetch_addresses_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Address>, sqlx::Error> {
    let addresses =
        sqlx::query_as("SELECT * FROM addresses WHERE user_id = $1 ORDER BY id").bind(user_id).fetch_all(conn).await?;
    Ok(addresses)
}

pub async fn insert_address(address: NewAddress, conn: &mut SqliteConnection) -> Result<Address, sqlx::Error> {
    let address = sqlx::query_as(
        r#"
        INSERT INTO addresses (user_id, full_name, line1, line2, city, state, postal_code, country, phone)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *;
        "#,
    )
    .bind(address.user_id)
    .bind(address.full_name)
    .bind(address.line1)
    .bind(address.line2)
    .bind(address.city)
    .bind(address.state)
    .bind(address.postal_code)
    .bind(address.country)
    .bind(address.phone)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(address)
}
