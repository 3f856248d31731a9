use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::traits::{PaymentProvider, PaymentRedirect, PaymentRequest, ProviderError, ProviderStatus};

#[derive(Debug, Default)]
struct Script {
    statuses: HashMap<String, Result<ProviderStatus, ProviderError>>,
    fail_initiation: Option<ProviderError>,
    requests: Vec<PaymentRequest>,
    status_queries: usize,
}

/// A payment provider whose answers are set up by the test.
///
/// Transactions that have not been scripted report `PAYMENT_PENDING`. Clones share the same script.
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    script: Arc<Mutex<Script>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, transaction_id: &str, status: ProviderStatus) {
        self.script.lock().unwrap().statuses.insert(transaction_id.to_string(), Ok(status));
    }

    pub fn set_status_error(&self, transaction_id: &str, error: ProviderError) {
        self.script.lock().unwrap().statuses.insert(transaction_id.to_string(), Err(error));
    }

    pub fn fail_initiation(&self, error: Option<ProviderError>) {
        self.script.lock().unwrap().fail_initiation = error;
    }

    /// Every payment request the provider has received, in order.
    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Option<PaymentRequest> {
        self.script.lock().unwrap().requests.last().cloned()
    }

    pub fn status_queries(&self) -> usize {
        self.script.lock().unwrap().status_queries
    }
}

impl PaymentProvider for FakeProvider {
    async fn initiate_payment(&self, request: PaymentRequest) -> Result<PaymentRedirect, ProviderError> {
        let mut script = self.script.lock().unwrap();
        if let Some(e) = script.fail_initiation.clone() {
            return Err(e);
        }
        let redirect_url = format!("https://pay.example.test/page/{}", request.transaction_id);
        script.requests.push(request);
        Ok(PaymentRedirect { redirect_url })
    }

    async fn check_status(&self, transaction_id: &str) -> Result<ProviderStatus, ProviderError> {
        let mut script = self.script.lock().unwrap();
        script.status_queries += 1;
        script
            .statuses
            .get(transaction_id)
            .cloned()
            .unwrap_or_else(|| Ok(ProviderStatus::failed("PAYMENT_PENDING")))
    }
}
