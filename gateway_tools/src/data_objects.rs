use serde::{Deserialize, Serialize};

/// The body of a pay request, before it is base64 encoded and signed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub merchant_id: String,
    pub merchant_transaction_id: String,
    pub merchant_user_id: String,
    /// Minor currency units
    pub amount: i64,
    pub redirect_url: String,
    pub redirect_mode: String,
    pub callback_url: String,
    pub mobile_number: String,
    pub payment_instrument: PayPageInstrument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayPageInstrument {
    #[serde(rename = "type")]
    pub instrument_type: String,
}

impl Default for PayPageInstrument {
    fn default() -> Self {
        Self { instrument_type: "PAY_PAGE".to_string() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayResponse {
    pub success: bool,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<PayResponseData>,
}

impl PayResponse {
    pub fn redirect_url(&self) -> Option<&str> {
        self.data.as_ref()?.instrument_response.as_ref()?.redirect_info.as_ref().map(|r| r.url.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayResponseData {
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default)]
    pub merchant_transaction_id: String,
    pub instrument_response: Option<InstrumentResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentResponse {
    #[serde(rename = "type", default)]
    pub instrument_type: String,
    pub redirect_info: Option<RedirectInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedirectInfo {
    pub url: String,
    #[serde(default)]
    pub method: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<TransactionStatus>,
}

impl StatusResponse {
    /// `true` only when the provider reports that the transaction completed.
    pub fn is_paid(&self) -> bool {
        self.success && self.code == "PAYMENT_SUCCESS"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default)]
    pub merchant_transaction_id: String,
    pub transaction_id: Option<String>,
    pub amount: Option<i64>,
    pub state: Option<String>,
    pub response_code: Option<String>,
    pub payment_instrument: Option<PaymentInstrumentDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentInstrumentDetail {
    #[serde(rename = "type")]
    pub instrument_type: Option<String>,
}
