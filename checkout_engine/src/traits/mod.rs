//! #  Database management and control.
//!
//! This module defines the interface contracts that checkout database *backends* implement, as well as the seam to
//! the payment provider.
//!
//! ## Traits
//! * [`CheckoutDatabase`] defines the highest level of behaviour: creating pending orders with their item snapshot,
//!   finalizing orders exactly once, conditional status changes and expiry.
//! * [`CartManagement`] manages the rows in a user's cart.
//! * [`OrderManagement`] provides read access to orders and their line items.
//! * [`StoreManagement`] manages the catalogue, user and address records that orders refer to.
//! * [`PaymentProvider`] is implemented by the integration with the hosted payment page provider.
mod cart_management;
mod checkout_database;
mod order_management;
mod payment_provider;
mod store_management;

mod data_objects;

pub use cart_management::CartManagement;
pub use checkout_database::{CheckoutDatabase, CheckoutDbError};
pub use data_objects::{ExpiryResult, FinalizeResult, ItemSource};
pub use order_management::OrderManagement;
pub use payment_provider::{PaymentProvider, PaymentRedirect, PaymentRequest, ProviderError, ProviderStatus};
pub use store_management::StoreManagement;
