use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::{
    checksum::{sign_request, sign_status_query, status_endpoint, PAY_ENDPOINT},
    config::GatewayConfig,
    data_objects::{PayRequest, PayResponse, StatusResponse},
    GatewayApiError,
};

#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn merchant_id(&self) -> &str {
        self.config.merchant_id.as_str()
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        headers: &[(&'static str, String)],
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        for (name, value) in headers {
            let value = HeaderValue::from_str(value).map_err(|e| GatewayApiError::RestRequestError(e.to_string()))?;
            req = req.header(*name, value);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Signs and submits a pay request. On success, the response carries the URL of the hosted payment page.
    pub async fn initiate_payment(&self, request: &PayRequest) -> Result<PayResponse, GatewayApiError> {
        let signed = sign_request(request, PAY_ENDPOINT, &self.config.salt_key, self.config.salt_index)?;
        let body = json!({ "request": signed.request });
        let headers = [("X-VERIFY", signed.checksum)];
        debug!("💳️ Initiating payment for transaction {}", request.merchant_transaction_id);
        let response = self.rest_query::<PayResponse, _>(Method::POST, PAY_ENDPOINT, &headers, Some(body)).await?;
        if !response.success {
            warn!(
                "💳️ Payment initiation for {} was refused. {}: {}",
                request.merchant_transaction_id, response.code, response.message
            );
            let message = format!("{}: {}", response.code, response.message);
            return Err(GatewayApiError::QueryError { status: 200, message });
        }
        if response.redirect_url().is_none() {
            return Err(GatewayApiError::MissingRedirect(response.code.clone()));
        }
        info!("💳️ Payment initiated for transaction {}", request.merchant_transaction_id);
        Ok(response)
    }

    /// Asks the provider for the current state of a transaction.
    ///
    /// The provider answers unpaid or failed transactions with a non-2xx status and a JSON body. Those bodies are
    /// decoded into a `StatusResponse` with `success: false` rather than returned as errors, so that callers only see
    /// an `Err` for transport or signing problems.
    pub async fn check_status(&self, merchant_transaction_id: &str) -> Result<StatusResponse, GatewayApiError> {
        let merchant_id = self.config.merchant_id.as_str();
        let checksum =
            sign_status_query(merchant_id, merchant_transaction_id, &self.config.salt_key, self.config.salt_index)?;
        let path = status_endpoint(merchant_id, merchant_transaction_id);
        let headers = [("X-VERIFY", checksum), ("X-MERCHANT-ID", merchant_id.to_string())];
        debug!("💳️ Checking status of transaction {merchant_transaction_id}");
        match self.rest_query::<StatusResponse, ()>(Method::GET, &path, &headers, None).await {
            Ok(status) => {
                info!("💳️ Transaction {merchant_transaction_id} status: {} ({})", status.code, status.success);
                Ok(status)
            },
            Err(GatewayApiError::QueryError { status, message }) => {
                warn!("💳️ Status query for {merchant_transaction_id} returned HTTP {status}");
                serde_json::from_str::<StatusResponse>(&message)
                    .map_err(|_| GatewayApiError::QueryError { status, message })
            },
            Err(e) => Err(e),
        }
    }
}
