use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderId;

fn random_suffix(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect::<String>().to_ascii_uppercase()
}

/// Mints a public order id, e.g. `ORD-20240618-7KD93JQ2`.
pub fn new_order_id() -> OrderId {
    let date = Utc::now().format("%Y%m%d");
    OrderId(format!("ORD-{date}-{}", random_suffix(8)))
}

/// Mints a merchant transaction id. The provider limits these to 35 alphanumeric characters.
pub fn new_transaction_id() -> String {
    format!("TXN{}{}", Utc::now().timestamp_millis(), random_suffix(10))
}
