use storefront_common::MoneyConversionError;
use thiserror::Error;

use crate::{
    checkout_api::cart_api::MAX_LINE_QUANTITY,
    db_types::{Money, OrderId, OrderStatusType},
    traits::{CheckoutDbError, ProviderError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutFlowError {
    #[error("{0}")]
    DatabaseError(#[from] CheckoutDbError),
    #[error("The mobile number must be exactly 10 digits, but was '{0}'")]
    InvalidMobileNumber(String),
    #[error("Address {0} does not exist")]
    AddressNotFound(i64),
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("The amount submitted ({submitted}) does not match the order total ({expected})")]
    AmountMismatch { expected: Money, submitted: Money },
    #[error("{0}")]
    ProviderError(#[from] ProviderError),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The requested order change would result in a no-op.")]
    OrderModificationNoOp,
    #[error("An order cannot be moved from {from} to {to}.")]
    OrderModificationForbidden { from: OrderStatusType, to: OrderStatusType },
    #[error("Order {0} was modified by someone else. Reload it and try again.")]
    OrderModificationConflict(OrderId),
}

#[derive(Debug, Clone, Error)]
pub enum CartApiError {
    #[error("{0}")]
    DatabaseError(#[from] CheckoutDbError),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Cart item {0} does not exist")]
    CartItemNotFound(i64),
    #[error("Quantity must be between 1 and {max}, but was {0}", max = MAX_LINE_QUANTITY)]
    InvalidQuantity(i64),
    #[error("{0}")]
    PricingError(#[from] MoneyConversionError),
}

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("{0}")]
    DatabaseError(#[from] CheckoutDbError),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
}

#[derive(Debug, Clone, Error)]
pub enum StoreApiError {
    #[error("{0}")]
    DatabaseError(#[from] CheckoutDbError),
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("User {0} does not exist")]
    UserNotFound(i64),
}
