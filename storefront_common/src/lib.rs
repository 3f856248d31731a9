mod money;

pub mod helpers;
pub mod op;
mod secret;

pub use helpers::{env_flag, parse_boolean_flag};
pub use money::{Money, MoneyConversionError, CURRENCY_CODE, MINOR_UNITS_PER_MAJOR};
pub use secret::Secret;
