use std::time::Duration;

use checkout_engine::{db_types::Order, CheckoutFlowApi, PaymentProvider, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval`, pending orders whose payment window has closed are cancelled.
pub fn start_expiry_worker<P>(api: CheckoutFlowApi<SqliteDatabase, P>, interval: Duration) -> JoinHandle<()>
where P: PaymentProvider + Send + Sync + 'static {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Unpaid order expiry worker started. Running every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Running unpaid order expiry job");
            match api.expire_old_orders().await {
                Ok(result) if result.count() > 0 => {
                    info!("🕰️ {} orders expired", result.count());
                    debug!("🕰️ Expired orders: {}", order_list(&result.cancelled));
                },
                Ok(_) => trace!("🕰️ No orders expired"),
                Err(e) => {
                    error!("🕰️ Error running unpaid order expiry job: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} user_id: {}", o.id, o.order_id, o.user_id))
        .collect::<Vec<String>>()
        .join(", ")
}
