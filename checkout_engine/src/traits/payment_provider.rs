use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::Money;

/// The details the provider needs to open a hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// The merchant transaction id. This is the key the status is later queried with.
    pub transaction_id: String,
    pub user_id: i64,
    pub amount: Money,
    /// Where the provider sends the browser (and its callback) once the payment completes or fails.
    pub redirect_url: String,
    pub mobile_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRedirect {
    pub redirect_url: String,
}

/// The provider's view of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub success: bool,
    pub code: String,
    /// The amount the provider says was paid, if it reported one.
    pub amount: Option<Money>,
    /// The raw instrument type reported by the provider, e.g. `UPI_INTENT`.
    pub payment_instrument: Option<String>,
}

impl ProviderStatus {
    pub fn paid<S: Into<String>>(amount: Money, instrument: Option<S>) -> Self {
        Self {
            success: true,
            code: "PAYMENT_SUCCESS".to_string(),
            amount: Some(amount),
            payment_instrument: instrument.map(Into::into),
        }
    }

    pub fn failed<S: Into<String>>(code: S) -> Self {
        Self { success: false, code: code.into(), amount: None, payment_instrument: None }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("The payment provider is not configured correctly. {0}")]
    Configuration(String),
    #[error("Could not sign the payment request. {0}")]
    Signing(String),
    #[error("The payment provider could not be reached. {0}")]
    Transport(String),
    #[error("The payment provider rejected the request. {0}")]
    Rejected(String),
}

/// The seam between the checkout flow and the hosted payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Opens a payment with the provider and returns the URL of the hosted payment page.
    async fn initiate_payment(&self, request: PaymentRequest) -> Result<PaymentRedirect, ProviderError>;

    /// Queries the provider for the current status of the given merchant transaction.
    async fn check_status(&self, transaction_id: &str) -> Result<ProviderStatus, ProviderError>;
}
