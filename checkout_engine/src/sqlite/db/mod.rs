//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
//!
//! Every statement is run to completion (`execute` or `fetch_all`, never `fetch_one`/`fetch_optional`), including
//! single-row lookups and writes with a `RETURNING` clause. A statement that is left unfinished keeps its implicit
//! transaction open: a write stays invisible to other pooled connections and holds the write lock.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod addresses;
pub mod cart;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod users;

const SQLITE_DB_URL: &str = "sqlite://data/storefront.db";

pub fn db_url() -> String {
    let result = env::var("CHECKOUT_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ CHECKOUT_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
