//! Server-side order pricing.
//!
//! The total charged is always computed here, from catalogue prices. The amount the customer submits is only ever
//! compared against it.
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use storefront_common::{MoneyConversionError, MINOR_UNITS_PER_MAJOR};

use crate::db_types::{CartLine, Money};

pub const DEFAULT_FREE_SHIPPING_THRESHOLD: Money = Money::from_minor(500_000);
pub const DEFAULT_SHIPPING_FEE: Money = Money::from_minor(50_000);
pub const DEFAULT_TAX_RATE_BPS: u32 = 1800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Orders with a subtotal at or above this amount ship for free.
    pub free_shipping_threshold: Money,
    pub shipping_fee: Money,
    /// Tax on the subtotal, in basis points (1800 = 18%).
    pub tax_rate_bps: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
            shipping_fee: DEFAULT_SHIPPING_FEE,
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub item_count: i64,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl PricingPolicy {
    /// Prices a set of `(unit price, quantity)` pairs. Fails if any amount along the way does not fit in [`Money`].
    pub fn price<I>(&self, items: I) -> Result<PriceBreakdown, MoneyConversionError>
    where I: IntoIterator<Item = (Money, i64)> {
        let too_large = || MoneyConversionError::new("the order total is too large");
        let (mut subtotal, mut item_count) = (Money::default(), 0i64);
        for (price, qty) in items {
            subtotal = price.checked_mul(qty).and_then(|line| subtotal.checked_add(line)).ok_or_else(too_large)?;
            item_count = item_count.checked_add(qty).ok_or_else(too_large)?;
        }
        let shipping = if subtotal.is_zero() || subtotal >= self.free_shipping_threshold {
            Money::default()
        } else {
            self.shipping_fee
        };
        let tax = subtotal.basis_points(self.tax_rate_bps).ok_or_else(too_large)?;
        let total = subtotal.checked_add(shipping).and_then(|t| t.checked_add(tax)).ok_or_else(too_large)?;
        Ok(PriceBreakdown { item_count, subtotal, shipping, tax, total })
    }

    pub fn price_lines(&self, lines: &[CartLine]) -> Result<PriceBreakdown, MoneyConversionError> {
        self.price(lines.iter().map(|l| (l.price, l.quantity)))
    }
}

/// Converts an amount in rupees to paise. Amounts with fractions of a paisa, or negative amounts, are rejected.
pub fn decimal_to_money(amount: Decimal) -> Result<Money, MoneyConversionError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyConversionError::new(format!("{amount} is negative")));
    }
    let minor = amount
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
        .ok_or_else(|| MoneyConversionError::new(format!("{amount} is too large")))?;
    if !minor.fract().is_zero() {
        return Err(MoneyConversionError::new(format!("{amount} has fractions of a paisa")));
    }
    minor.to_i64().map(Money::from).ok_or_else(|| MoneyConversionError::new(format!("{amount} is too large")))
}
