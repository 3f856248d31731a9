use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem};

/// Where the items of a finalized order come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    /// The cart lines and prices snapshotted when the order was created. Only those cart rows are removed.
    #[default]
    Snapshot,
    /// The user's cart as it is at verification time, at current prices. The whole cart is cleared.
    LiveCart,
}

impl Display for ItemSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemSource::Snapshot => write!(f, "snapshot"),
            ItemSource::LiveCart => write!(f, "live_cart"),
        }
    }
}

impl FromStr for ItemSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Ok(Self::Snapshot),
            "live_cart" | "livecart" | "cart" => Ok(Self::LiveCart),
            s => Err(format!("Unknown item source: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeResult {
    /// This call moved the order to `processing` and wrote its items.
    Finalized { order: Order, items: Vec<OrderItem> },
    /// The order was no longer pending when the update ran. Carries the order as it is now.
    NotPending(Order),
    /// There was nothing to materialize. The order is still pending.
    EmptyCart,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpiryResult {
    pub cancelled: Vec<Order>,
}

impl ExpiryResult {
    pub fn new(cancelled: Vec<Order>) -> Self {
        Self { cancelled }
    }

    pub fn count(&self) -> usize {
        self.cancelled.len()
    }
}
