//! Request signing for the payment provider.
//!
//! The provider authenticates requests with an `X-VERIFY` header of the form
//! `hex(sha256(payload || salt_key)) + "###" + salt_index`. For a payment request the payload is the base64-encoded
//! JSON body followed by the endpoint path; for a status query it is the endpoint path alone.
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use sha2::{Digest, Sha256};
use storefront_common::Secret;

use crate::GatewayApiError;

pub const PAY_ENDPOINT: &str = "/pg/v1/pay";
const SEPARATOR: &str = "###";

/// A request body that is ready to send, along with its `X-VERIFY` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// The base64 encoded JSON body.
    pub request: String,
    pub checksum: String,
}

pub fn status_endpoint(merchant_id: &str, merchant_transaction_id: &str) -> String {
    format!("/pg/v1/status/{merchant_id}/{merchant_transaction_id}")
}

/// Computes the `X-VERIFY` signature for the given payload. This is a pure function.
pub fn generate_checksum(payload: &str, salt_key: &str, salt_index: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(salt_key.as_bytes());
    let digest = hasher.finalize();
    format!("{digest:x}{SEPARATOR}{salt_index}")
}

/// Serializes `request` to JSON, base64 encodes it and signs `encoded || endpoint`.
///
/// An empty salt key or an empty payload is refused, so a misconfigured server never sends an unsigned charge.
pub fn sign_request<T: Serialize>(
    request: &T,
    endpoint: &str,
    salt_key: &Secret<String>,
    salt_index: u32,
) -> Result<SignedPayload, GatewayApiError> {
    if salt_key.is_empty() {
        return Err(GatewayApiError::MissingSecret);
    }
    let json = serde_json::to_string(request).map_err(|e| GatewayApiError::MalformedPayload(e.to_string()))?;
    if json.is_empty() || json == "null" || json == "{}" {
        return Err(GatewayApiError::MalformedPayload("The request body is empty".to_string()));
    }
    let encoded = STANDARD.encode(json.as_bytes());
    let checksum = generate_checksum(&format!("{encoded}{endpoint}"), salt_key.reveal(), salt_index);
    Ok(SignedPayload { request: encoded, checksum })
}

/// Signs a status query for the given transaction.
pub fn sign_status_query(
    merchant_id: &str,
    merchant_transaction_id: &str,
    salt_key: &Secret<String>,
    salt_index: u32,
) -> Result<String, GatewayApiError> {
    if salt_key.is_empty() {
        return Err(GatewayApiError::MissingSecret);
    }
    if merchant_transaction_id.is_empty() {
        return Err(GatewayApiError::MalformedPayload("The transaction id is empty".to_string()));
    }
    let endpoint = status_endpoint(merchant_id, merchant_transaction_id);
    Ok(generate_checksum(&endpoint, salt_key.reveal(), salt_index))
}

/// Checks a signature received from the provider, e.g. on a server-to-server callback.
pub fn verify_checksum(payload: &str, signature: &str, salt_key: &str, salt_index: u32) -> bool {
    if salt_key.is_empty() {
        return false;
    }
    let expected = generate_checksum(payload, salt_key, salt_index);
    // Case-insensitive on the hex digest only
    match (expected.split_once(SEPARATOR), signature.split_once(SEPARATOR)) {
        (Some((e_hash, e_idx)), Some((s_hash, s_idx))) => e_hash.eq_ignore_ascii_case(s_hash) && e_idx == s_idx,
        _ => false,
    }
}
