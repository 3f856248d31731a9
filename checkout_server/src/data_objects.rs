use std::{fmt::Display, str::FromStr};

use checkout_engine::{
    db_types::{NewProduct, OrderStatusType},
    order_objects::OrderQueryFilter,
    pricing::decimal_to_money,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The query (or form) parameters of a payment verification redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "orderId", default)]
    pub order_id: Option<String>,
    #[serde(rename = "transactionId", default)]
    pub transaction_id: Option<String>,
}

impl VerifyParams {
    /// Fills in whatever is missing here from `other`.
    pub fn or(self, other: Option<VerifyParams>) -> Self {
        let other = other.unwrap_or_default();
        Self {
            order_id: self.order_id.or(other.order_id),
            transaction_id: self.transaction_id.or(other.transaction_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartParams {
    pub product_id: i64,
    #[serde(default = "one")]
    pub quantity: i64,
    #[serde(default)]
    pub color: String,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuantityParams {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateParams {
    pub status: OrderStatusType,
}

/// A catalogue entry as submitted by an admin. The price is in rupees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductParams {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub price: Decimal,
}

impl TryFrom<ProductParams> for NewProduct {
    type Error = String;

    fn try_from(params: ProductParams) -> Result<Self, Self::Error> {
        let price = decimal_to_money(params.price).map_err(|e| e.to_string())?;
        let product = NewProduct::new(params.name, price);
        Ok(match params.id {
            Some(id) => product.with_id(id),
            None => product,
        })
    }
}

/// Admin order search. `status` is a comma-separated list, e.g. `pending,cancelled`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSearchParams {
    pub status: Option<String>,
    pub user_id: Option<i64>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TryFrom<OrderSearchParams> for OrderQueryFilter {
    type Error = String;

    fn try_from(params: OrderSearchParams) -> Result<Self, Self::Error> {
        let status = params
            .status
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(OrderStatusType::from_str)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|e| e.to_string())?;
        Ok(OrderQueryFilter { order_id: None, user_id: params.user_id, since: params.since, until: params.until, status })
    }
}
