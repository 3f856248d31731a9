//! Data types that are stored in, and read from, the checkout database.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
pub use storefront_common::Money;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        Role        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been created at payment initiation, and payment has not been verified yet.
    Pending,
    /// Payment has been verified and the order items have been materialized.
    Processing,
    Shipped,
    Delivered,
    /// Cancelled by an admin, or expired while still pending.
    Cancelled,
}

impl OrderStatusType {
    /// True for every status that a verified payment leads to.
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Processing | Self::Shipped | Self::Delivered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The public order identifier. This is what customers see, and what appears in redirect URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        User       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

impl NewUser {
    pub fn new<S: Into<String>>(email: S, name: S) -> Self {
        Self { email: email.into(), name: name.into() }
    }
}

//--------------------------------------        Product       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creates a product, or updates the name and price of an existing one when `id` is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: Option<i64>,
    pub name: String,
    pub price: Money,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Money) -> Self {
        Self { id: None, name: name.into(), price }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

//--------------------------------------        CartItem       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartItem {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub color: String,
}

impl NewCartItem {
    pub fn new(user_id: i64, product_id: i64, quantity: i64) -> Self {
        Self { user_id, product_id, quantity, color: String::default() }
    }

    pub fn with_color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = color.into();
        self
    }
}

/// A cart row joined with the product's current name and price.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub cart_item_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub color: String,
    pub quantity: i64,
    pub price: Money,
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: i64,
    pub status: OrderStatusType,
    pub total_amount: Money,
    pub payment_method: Option<String>,
    pub address_id: i64,
    /// The merchant transaction id sent to the payment provider.
    pub transaction_id: String,
    pub mobile_number: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: i64,
    pub total_amount: Money,
    pub address_id: i64,
    pub transaction_id: String,
    pub mobile_number: String,
    pub expires_at: DateTime<Utc>,
}

//--------------------------------------    PendingOrderItem    ---------------------------------------------------------
/// A snapshot of one cart line, taken when the order was created.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingOrderItem {
    pub id: i64,
    pub order_id: i64,
    pub cart_item_id: i64,
    pub product_id: i64,
    pub color: String,
    pub quantity: i64,
    pub price: Money,
}

//--------------------------------------        OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub id: i64,
    /// The internal id of the order (`Order::id`).
    pub order_id: i64,
    pub product_id: i64,
    pub color: String,
    pub quantity: i64,
    pub price: Money,
}

impl OrderItem {
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }
}

/// A line item that is about to be written to `order_items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub cart_item_id: i64,
    pub product_id: i64,
    pub color: String,
    pub quantity: i64,
    pub price: Money,
}

impl From<PendingOrderItem> for NewOrderItem {
    fn from(item: PendingOrderItem) -> Self {
        Self {
            cart_item_id: item.cart_item_id,
            product_id: item.product_id,
            color: item.color,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

impl From<CartLine> for NewOrderItem {
    fn from(line: CartLine) -> Self {
        Self {
            cart_item_id: line.cart_item_id,
            product_id: line.product_id,
            color: line.color,
            quantity: line.quantity,
            price: line.price,
        }
    }
}

//--------------------------------------        Address       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.full_name, self.line1)?;
        if let Some(line2) = self.line2.as_ref().filter(|s| !s.is_empty()) {
            write!(f, ", {line2}")?;
        }
        write!(f, ", {}, {} {}, {}", self.city, self.state, self.postal_code, self.country)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
    #[serde(default)]
    pub user_id: i64,
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub phone: String,
}

fn default_country() -> String {
    "India".to_string()
}
