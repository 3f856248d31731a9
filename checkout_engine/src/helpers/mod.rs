mod identifiers;
mod mobile_number;
mod payment_method;

pub use identifiers::{new_order_id, new_transaction_id};
pub use mobile_number::is_valid_mobile_number;
pub use payment_method::clean_payment_method;
