//! Connects the checkout flow to the hosted payment page provider.
use checkout_engine::{
    db_types::Money,
    PaymentProvider,
    PaymentRedirect,
    PaymentRequest,
    ProviderError,
    ProviderStatus,
};
use gateway_tools::{GatewayApi, GatewayApiError, GatewayConfig, PayPageInstrument, PayRequest, StatusResponse};
use log::*;

/// [`PaymentProvider`] backed by the provider's REST API.
#[derive(Clone)]
pub struct GatewayProvider {
    api: GatewayApi,
}

impl GatewayProvider {
    pub fn new(config: GatewayConfig) -> Result<Self, ProviderError> {
        if config.salt_key.is_empty() {
            warn!("💳️ CHECKOUT_GATEWAY_SALT_KEY is not set. Payments cannot be started until it is.");
        }
        let api = GatewayApi::new(config).map_err(to_provider_error)?;
        Ok(Self { api })
    }

    fn pay_request(&self, request: PaymentRequest) -> PayRequest {
        PayRequest {
            merchant_id: self.api.merchant_id().to_string(),
            merchant_transaction_id: request.transaction_id,
            merchant_user_id: format!("MUID{}", request.user_id),
            amount: request.amount.value(),
            callback_url: request.redirect_url.clone(),
            redirect_url: request.redirect_url,
            redirect_mode: "REDIRECT".to_string(),
            mobile_number: request.mobile_number,
            payment_instrument: PayPageInstrument::default(),
        }
    }
}

impl PaymentProvider for GatewayProvider {
    async fn initiate_payment(&self, request: PaymentRequest) -> Result<PaymentRedirect, ProviderError> {
        let txid = request.transaction_id.clone();
        let body = self.pay_request(request);
        debug!("💳️ Initiating payment {txid} for {}", Money::from(body.amount));
        let response = self.api.initiate_payment(&body).await.map_err(to_provider_error)?;
        let redirect_url = response
            .redirect_url()
            .ok_or_else(|| ProviderError::Rejected(format!("No redirect URL in response. Code: {}", response.code)))?
            .to_string();
        info!("💳️ Payment page opened for {txid}");
        Ok(PaymentRedirect { redirect_url })
    }

    async fn check_status(&self, transaction_id: &str) -> Result<ProviderStatus, ProviderError> {
        let response = self.api.check_status(transaction_id).await.map_err(to_provider_error)?;
        debug!("💳️ Transaction {transaction_id} is {} ({})", response.code, response.message);
        Ok(provider_status(response))
    }
}

fn provider_status(response: StatusResponse) -> ProviderStatus {
    let success = response.is_paid();
    let data = response.data.unwrap_or_default();
    ProviderStatus {
        success,
        code: response.code,
        amount: data.amount.map(Money::from),
        payment_instrument: data.payment_instrument.and_then(|p| p.instrument_type),
    }
}

fn to_provider_error(e: GatewayApiError) -> ProviderError {
    match e {
        GatewayApiError::Initialization(_) | GatewayApiError::MissingSecret => ProviderError::Configuration(e.to_string()),
        GatewayApiError::MalformedPayload(_) => ProviderError::Signing(e.to_string()),
        GatewayApiError::RestRequestError(_) | GatewayApiError::RestResponseError(_) | GatewayApiError::JsonError(_) => {
            ProviderError::Transport(e.to_string())
        },
        GatewayApiError::QueryError { .. } | GatewayApiError::MissingRedirect(_) => ProviderError::Rejected(e.to_string()),
    }
}
