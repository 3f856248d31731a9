use std::{env, fmt::Display, str::FromStr, time::Duration};

use checkout_engine::{
    pricing::{
        decimal_to_money,
        PricingPolicy,
        DEFAULT_FREE_SHIPPING_THRESHOLD,
        DEFAULT_SHIPPING_FEE,
        DEFAULT_TAX_RATE_BPS,
    },
    CheckoutOptions,
    ItemSource,
    DEFAULT_ORDER_TTL_HOURS,
};
use gateway_tools::GatewayConfig;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use rust_decimal::Decimal;
use storefront_common::{env_flag, Money, Secret};

const DEFAULT_CHECKOUT_HOST: &str = "127.0.0.1";
const DEFAULT_CHECKOUT_PORT: u16 = 8360;
const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";
const DEFAULT_EXPIRY_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The externally reachable base URL of this server. The payment provider sends the browser back to
    /// `{public_url}/payment/verify`.
    pub public_url: String,
    /// The storefront that the verification endpoint redirects to once a payment has been checked.
    pub storefront_url: String,
    /// Key for signing session tokens.
    pub session_secret: Secret<String>,
    pub unpaid_order_timeout: chrono::Duration,
    pub expiry_interval: Duration,
    pub item_source: ItemSource,
    pub pricing: PricingPolicy,
    pub gateway: GatewayConfig,
    /// `None` when no SMTP server is configured. Confirmation e-mails are then only logged.
    pub email: Option<EmailConfig>,
    pub run_migrations: bool,
}

#[derive(Clone, Debug, Default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: Secret<String>,
    pub from_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CHECKOUT_HOST.to_string(),
            port: DEFAULT_CHECKOUT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            public_url: format!("http://{DEFAULT_CHECKOUT_HOST}:{DEFAULT_CHECKOUT_PORT}"),
            storefront_url: DEFAULT_STOREFRONT_URL.to_string(),
            session_secret: Secret::default(),
            unpaid_order_timeout: chrono::Duration::hours(DEFAULT_ORDER_TTL_HOURS),
            expiry_interval: DEFAULT_EXPIRY_INTERVAL,
            item_source: ItemSource::default(),
            pricing: PricingPolicy::default(),
            gateway: GatewayConfig::default(),
            email: None,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CHECKOUT_HOST").ok().unwrap_or_else(|| DEFAULT_CHECKOUT_HOST.into());
        let port = parse_env("CHECKOUT_PORT", DEFAULT_CHECKOUT_PORT);
        let database_url = env::var("CHECKOUT_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CHECKOUT_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let public_url = env::var("CHECKOUT_PUBLIC_URL").ok().unwrap_or_else(|| {
            let url = format!("http://{host}:{port}");
            warn!(
                "🪛️ CHECKOUT_PUBLIC_URL is not set. The payment provider will redirect customers to {url}, which is \
                 probably not what you want in production."
            );
            url
        });
        let storefront_url = env::var("CHECKOUT_STOREFRONT_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CHECKOUT_STOREFRONT_URL is not set. Using {DEFAULT_STOREFRONT_URL}");
            DEFAULT_STOREFRONT_URL.to_string()
        });
        let session_secret = env::var("CHECKOUT_SESSION_SECRET").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| {
            warn!(
                "🪛️ CHECKOUT_SESSION_SECRET is not set. A random key will be used, and every session token will \
                 become invalid when the server restarts."
            );
            random_secret()
        });
        let unpaid_hours = parse_env("CHECKOUT_UNPAID_ORDER_TIMEOUT", DEFAULT_ORDER_TTL_HOURS);
        let expiry_secs = parse_env("CHECKOUT_EXPIRY_INTERVAL_SECS", DEFAULT_EXPIRY_INTERVAL.as_secs()).max(1);
        let item_source = parse_env("CHECKOUT_ITEM_SOURCE", ItemSource::default());
        let pricing = PricingPolicy {
            free_shipping_threshold: money_env("CHECKOUT_FREE_SHIPPING_THRESHOLD", DEFAULT_FREE_SHIPPING_THRESHOLD),
            shipping_fee: money_env("CHECKOUT_SHIPPING_FEE", DEFAULT_SHIPPING_FEE),
            tax_rate_bps: parse_env("CHECKOUT_TAX_RATE_BPS", DEFAULT_TAX_RATE_BPS),
        };
        info!(
            "🪛️ Pricing: free shipping from {}, otherwise {}. Tax at {} bps",
            pricing.free_shipping_threshold, pricing.shipping_fee, pricing.tax_rate_bps
        );
        let gateway = GatewayConfig::new_from_env_or_default();
        let email = EmailConfig::from_env();
        let run_migrations = env_flag("CHECKOUT_RUN_MIGRATIONS", true);
        Self {
            host,
            port,
            database_url,
            public_url,
            storefront_url,
            session_secret: Secret::new(session_secret),
            unpaid_order_timeout: chrono::Duration::hours(unpaid_hours),
            expiry_interval: Duration::from_secs(expiry_secs),
            item_source,
            pricing,
            gateway,
            email,
            run_migrations,
        }
    }

    pub fn checkout_options(&self) -> CheckoutOptions {
        CheckoutOptions {
            public_url: self.public_url.clone(),
            order_ttl: self.unpaid_order_timeout,
            item_source: self.item_source,
            pricing: self.pricing,
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Option<Self> {
        let Some(smtp_host) = env::var("CHECKOUT_SMTP_HOST").ok().filter(|s| !s.trim().is_empty()) else {
            info!("🪛️ CHECKOUT_SMTP_HOST is not set. Order confirmations will be logged, not e-mailed.");
            return None;
        };
        let smtp_username = env::var("CHECKOUT_SMTP_USERNAME").unwrap_or_default();
        let smtp_password = Secret::new(env::var("CHECKOUT_SMTP_PASSWORD").unwrap_or_default());
        let from_address = env::var("CHECKOUT_EMAIL_FROM").ok().unwrap_or_else(|| {
            warn!("🪛️ CHECKOUT_EMAIL_FROM is not set. Using the SMTP username as the sender.");
            smtp_username.clone()
        });
        Some(Self { smtp_host, smtp_username, smtp_password, from_address })
    }
}

/// Parses an environment variable, falling back to `default` (with a log message) if it is missing or invalid.
fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default, {default}.");
            default
        },
    }
}

/// Reads an amount in rupees, e.g. `CHECKOUT_SHIPPING_FEE=500` or `=499.50`.
fn money_env(name: &str, default: Money) -> Money {
    let Ok(s) = env::var(name) else {
        return default;
    };
    let amount = s
        .trim()
        .parse::<Decimal>()
        .map_err(|e| e.to_string())
        .and_then(|d| decimal_to_money(d).map_err(|e| e.to_string()));
    match amount {
        Ok(m) => m,
        Err(e) => {
            error!("🪛️ {s} is not a valid amount for {name}. {e} Using the default, {default}, instead.");
            default
        },
    }
}

fn random_secret() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect()
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The part of the configuration that route handlers need. Secrets stay out of it.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub storefront_url: String,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { storefront_url: config.storefront_url.trim_end_matches('/').to_string() }
    }
}
