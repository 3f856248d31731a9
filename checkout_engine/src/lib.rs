//! Storefront checkout engine
//!
//! This library contains the core logic of the storefront checkout: carts, pricing, pending orders, payment
//! verification and order lifecycle management. It is agnostic of the HTTP layer and of the concrete payment provider.
//!
//! The library is divided into three main sections:
//! 1. Storage contracts ([`mod@traits`]) and their SQLite implementation ([`SqliteDatabase`]). You should never need
//!    to touch the database directly. The exception is the data types stored in the database, which are defined in
//!    [`mod@db_types`] and are public.
//! 2. The public API ([`CheckoutFlowApi`], [`CartApi`], [`OrderApi`] and [`StoreApi`]). These are generic over the
//!    storage traits, so any backend that implements them can be used.
//! 3. Events ([`mod@events`]). When an order is finalized after a verified payment, or is cancelled, an event is
//!    emitted. Hooks subscribe to these to send e-mails, update fulfilment systems and so on.
mod checkout_api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use checkout_api::{
    cart_api::{CartApi, MAX_LINE_QUANTITY},
    checkout_flow_api::{check_transition, CheckoutFlowApi, CheckoutOptions, DEFAULT_ORDER_TTL_HOURS},
    errors::{CartApiError, CheckoutFlowError, OrderApiError, StoreApiError},
    order_api::OrderApi,
    order_objects,
    pricing,
    store_api::StoreApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db::db_url, SqliteDatabase};
pub use traits::{
    CartManagement,
    CheckoutDatabase,
    CheckoutDbError,
    ExpiryResult,
    FinalizeResult,
    ItemSource,
    OrderManagement,
    PaymentProvider,
    PaymentRedirect,
    PaymentRequest,
    ProviderError,
    ProviderStatus,
    StoreManagement,
};
