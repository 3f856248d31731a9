//! # Checkout engine public API
//!
//! The `checkout_api` module exposes the programmatic API of the checkout engine. The API is modular, so that clients
//! can pick and choose the functionality they want.
//!
//! * [`checkout_flow_api`] is the primary API. It initiates payments, verifies them, finalizes orders exactly once,
//!   changes order status and expires abandoned orders.
//! * [`cart_api`] manages the contents of a user's cart.
//! * [`order_api`] lets customers see their orders and admins search all orders.
//! * [`store_api`] maintains products, users and shipping addresses.
//! * [`pricing`] computes subtotals, shipping and tax.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits it requires.
//!
//! ```rust,ignore
//! use checkout_engine::{CartApi, SqliteDatabase, PricingPolicy};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements CartManagement and StoreManagement
//! let api = CartApi::new(db, PricingPolicy::default());
//! let cart = api.cart(user_id).await?;
//! ```

pub mod cart_api;
pub mod checkout_flow_api;
pub mod errors;
pub mod order_api;
pub mod order_objects;
pub mod pricing;
pub mod store_api;
