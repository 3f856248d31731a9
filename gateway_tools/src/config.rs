use std::time::Duration;

use log::*;
use storefront_common::Secret;

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// e.g. `https://api-preprod.phonepe.com/apis/pg-sandbox`. The `/pg/v1/...` paths are appended to this.
    pub base_url: String,
    pub merchant_id: String,
    pub salt_key: Secret<String>,
    pub salt_index: u32,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            merchant_id: "MERCHANTUAT".to_string(),
            salt_key: Secret::default(),
            salt_index: 1,
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("CHECKOUT_GATEWAY_BASE_URL").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_GATEWAY_BASE_URL not set, using {} as default", defaults.base_url);
            defaults.base_url.clone()
        });
        let merchant_id = std::env::var("CHECKOUT_GATEWAY_MERCHANT_ID").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_GATEWAY_MERCHANT_ID not set, using (probably useless) default");
            defaults.merchant_id.clone()
        });
        let salt_key = Secret::new(std::env::var("CHECKOUT_GATEWAY_SALT_KEY").unwrap_or_else(|_| {
            error!("🪛️ CHECKOUT_GATEWAY_SALT_KEY not set. Payment requests will be refused until it is configured.");
            String::default()
        }));
        let salt_index = std::env::var("CHECKOUT_GATEWAY_SALT_INDEX")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("🪛️ Invalid CHECKOUT_GATEWAY_SALT_INDEX ({s}): {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(defaults.salt_index);
        let timeout = std::env::var("CHECKOUT_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid CHECKOUT_GATEWAY_TIMEOUT_SECS ({s}): {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        Self { base_url, merchant_id, salt_key, salt_index, timeout }
    }
}
