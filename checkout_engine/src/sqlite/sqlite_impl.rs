//! `SqliteDatabase` is a concrete implementation of a checkout engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//! Each trait method acquires a connection (or a transaction, if more than one write is involved) and composes the
//! free functions in [`super::db`].
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{addresses, cart, db_url, new_pool, order_items, orders, products, users};
use crate::{
    db_types::{
        Address,
        CartItem,
        CartLine,
        NewAddress,
        NewCartItem,
        NewOrder,
        NewOrderItem,
        NewProduct,
        NewUser,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        PendingOrderItem,
        Product,
        User,
    },
    order_objects::OrderQueryFilter,
    traits::{
        CartManagement,
        CheckoutDatabase,
        CheckoutDbError,
        FinalizeResult,
        ItemSource,
        OrderManagement,
        StoreManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_pending_order(
        &self,
        order: NewOrder,
        lines: &[CartLine],
    ) -> Result<(Order, Vec<PendingOrderItem>), CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        let items = order_items::insert_pending_items(order.id, lines, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} is pending with {} snapshotted items", order.order_id, items.len());
        Ok((order, items))
    }

    async fn finalize_order(
        &self,
        order: &Order,
        payment_method: &str,
        source: ItemSource,
    ) -> Result<FinalizeResult, CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        // This must be the first statement of the transaction
        let updated = orders::mark_as_processing(order.id, payment_method, &mut tx).await?;
        if updated == 0 {
            tx.rollback().await?;
            let mut conn = self.pool.acquire().await?;
            let current = orders::fetch_order_by_id(order.id, &mut conn)
                .await?
                .ok_or_else(|| CheckoutDbError::OrderNotFound(order.order_id.clone()))?;
            debug!("🗃️ Order {} is {} and was not finalized again", current.order_id, current.status);
            return Ok(FinalizeResult::NotPending(current));
        }
        let items: Vec<NewOrderItem> = match source {
            ItemSource::Snapshot => order_items::fetch_pending_items(order.id, &mut tx)
                .await?
                .into_iter()
                .map(NewOrderItem::from)
                .collect(),
            ItemSource::LiveCart => {
                cart::fetch_cart_lines(order.user_id, &mut tx).await?.into_iter().map(NewOrderItem::from).collect()
            },
        };
        if items.is_empty() {
            tx.rollback().await?;
            warn!("🗃️ Order {} has no items to materialize ({source}). It remains pending.", order.order_id);
            return Ok(FinalizeResult::EmptyCart);
        }
        let rows = order_items::insert_order_items(order.id, &items, &mut tx).await?;
        let removed = match source {
            ItemSource::Snapshot => {
                let taken = items.iter().map(|i| (i.cart_item_id, i.quantity)).collect::<Vec<_>>();
                cart::deduct_items(order.user_id, &taken, &mut tx).await?
            },
            ItemSource::LiveCart => cart::clear_cart(order.user_id, &mut tx).await?,
        };
        let order = orders::fetch_order_by_id(order.id, &mut tx)
            .await?
            .ok_or_else(|| CheckoutDbError::OrderNotFound(order.order_id.clone()))?;
        tx.commit().await?;
        debug!(
            "🗃️ Order {} finalized with {} items. {removed} rows removed from the cart of user #{}",
            order.order_id,
            rows.len(),
            order.user_id
        );
        Ok(FinalizeResult::Finalized { order, items: rows })
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        old_status: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, old_status, new_status, &mut conn).await?;
        match &order {
            Some(_) => debug!("🗃️ Order {order_id} moved from {old_status} to {new_status}"),
            None => debug!("🗃️ Order {order_id} was not {old_status}. Status unchanged."),
        }
        Ok(order)
    }

    async fn expire_orders(&self, now: DateTime<Utc>) -> Result<Vec<Order>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::expire_orders(now, &mut conn).await?;
        Ok(orders)
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, user_id: i64) -> Result<Vec<CartLine>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let lines = cart::fetch_cart_lines(user_id, &mut conn).await?;
        Ok(lines)
    }

    async fn add_cart_item(&self, item: NewCartItem) -> Result<CartItem, CheckoutDbError> {
        if item.quantity < 1 {
            return Err(CheckoutDbError::InvalidQuantity(item.quantity));
        }
        let mut conn = self.pool.acquire().await?;
        let row = cart::upsert_item(item, &mut conn).await?;
        trace!("🗃️ Cart item #{} for user #{} now has quantity {}", row.id, row.user_id, row.quantity);
        Ok(row)
    }

    async fn update_cart_item_quantity(
        &self,
        user_id: i64,
        cart_item_id: i64,
        quantity: i64,
    ) -> Result<Option<CartItem>, CheckoutDbError> {
        if quantity < 1 {
            return Err(CheckoutDbError::InvalidQuantity(quantity));
        }
        let mut conn = self.pool.acquire().await?;
        let row = cart::update_quantity(user_id, cart_item_id, quantity, &mut conn).await?;
        Ok(row)
    }

    async fn remove_cart_item(&self, user_id: i64, cart_item_id: i64) -> Result<bool, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let removed = cart::remove_item(user_id, cart_item_id, &mut conn).await?;
        Ok(removed)
    }

    async fn clear_cart(&self, user_id: i64) -> Result<u64, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let removed = cart::clear_cart(user_id, &mut conn).await?;
        Ok(removed)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let items = order_items::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_pending_order_items(&self, order_id: i64) -> Result<Vec<PendingOrderItem>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let items = order_items::fetch_pending_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}

impl StoreManagement for SqliteDatabase {
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        if let Some(existing) = users::fetch_user_by_email(&user.email, &mut conn).await? {
            debug!("🗃️ User {} already exists with id {}", existing.email, existing.id);
            return Ok(existing);
        }
        let user = users::insert_user(user, &mut conn).await?;
        debug!("🗃️ User {} created with id {}", user.email, user.id);
        Ok(user)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(&mut conn).await?;
        Ok(products)
    }

    async fn upsert_product(&self, product: NewProduct) -> Result<Product, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let result = match product.id {
            Some(id) => products::update_product(id, &product.name, product.price, &mut conn)
                .await?
                .ok_or(CheckoutDbError::ProductNotFound(id))?,
            None => products::insert_product(&product.name, product.price, &mut conn).await?,
        };
        debug!("🗃️ Product #{} '{}' saved with price {}", result.id, result.name, result.price);
        Ok(result)
    }

    async fn fetch_address(&self, address_id: i64) -> Result<Option<Address>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let address = addresses::fetch_address(address_id, &mut conn).await?;
        Ok(address)
    }

    async fn fetch_addresses_for_user(&self, user_id: i64) -> Result<Vec<Address>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let addresses = addresses::fetch_addresses_for_user(user_id, &mut conn).await?;
        Ok(addresses)
    }

    async fn insert_address(&self, address: NewAddress) -> Result<Address, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let user_id = address.user_id;
        if users::fetch_user(user_id, &mut conn).await?.is_none() {
            return Err(CheckoutDbError::UserNotFound(user_id));
        }
        let address = addresses::insert_address(address, &mut conn).await?;
        Ok(address)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
