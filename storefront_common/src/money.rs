use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "INR";
/// Number of minor units (paise) in one major unit (rupee).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

//--------------------------------------        Money         ---------------------------------------------------------
/// A currency amount, stored as an integer number of minor units (paise).
///
/// Prices, totals and provider amounts are all carried as `Money`, so there is never any floating point arithmetic
/// on amounts that get charged.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as an amount of money: {0}")]
pub struct MoneyConversionError(String);

impl MoneyConversionError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        Self(msg.into())
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {value} is too large to convert to Money")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let minor = MINOR_UNITS_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}₹{}.{:02}", abs / minor, abs % minor)
    }
}

impl Money {
    /// The amount in minor units (paise).
    pub fn value(&self) -> i64 {
        self.0
    }

    pub const fn from_minor(paise: i64) -> Self {
        Self(paise)
    }

    pub fn from_major(rupees: i64) -> Self {
        Self(rupees * MINOR_UNITS_PER_MAJOR)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `quantity` units at this price, or `None` if the result does not fit.
    pub fn checked_mul(self, quantity: i64) -> Option<Self> {
        self.0.checked_mul(quantity).map(Self)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Returns `bps` basis points of this amount, rounded half away from zero to the nearest minor unit, or `None` if
    /// the result does not fit.
    pub fn basis_points(&self, bps: u32) -> Option<Self> {
        let scaled = i128::from(self.0) * i128::from(bps);
        let half = if scaled < 0 { -5_000 } else { 5_000 };
        i64::try_from((scaled + half) / 10_000).ok().map(Self)
    }
}
