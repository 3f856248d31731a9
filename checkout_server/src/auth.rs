//! Session tokens.
//!
//! A session token is `base64url(json(claims)).base64url(hmac_sha256(secret, first_part))`. The storefront's login
//! flow (or the `token` CLI command) issues them, and clients send them back in the `checkout_session` header or
//! cookie.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use checkout_engine::db_types::Role;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use log::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use storefront_common::Secret;

use crate::errors::{AuthError, ServerError};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_HEADER: &str = "checkout_session";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub roles: Vec<Role>,
    /// Expiry, as a unix timestamp in seconds.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user_id: i64, roles: Vec<Role>, ttl: Duration) -> Self {
        let exp = (Utc::now() + ttl).timestamp();
        Self { user_id, roles, exp }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Admins implicitly hold every role.
    pub fn has_roles(&self, required: &[Role]) -> bool {
        self.is_admin() || required.iter().all(|r| self.roles.contains(r))
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

pub struct TokenIssuer {
    key: Secret<String>,
}

impl TokenIssuer {
    pub fn new(key: &Secret<String>) -> Self {
        Self { key: key.clone() }
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.key.reveal().as_bytes()).map_err(|e| AuthError::ValidationError(e.to_string()))
    }

    pub fn issue_token(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        let json = serde_json::to_vec(claims).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    /// Checks the signature and expiry of a token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let (payload, signature) = token
            .trim()
            .split_once('.')
            .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected two parts separated by '.'".into()))?;
        let signature =
            URL_SAFE_NO_PAD.decode(signature).map_err(|e| AuthError::PoorlyFormattedToken(format!("signature: {e}")))?;
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| AuthError::ValidationError("signature mismatch".into()))?;
        let json = URL_SAFE_NO_PAD.decode(payload).map_err(|e| AuthError::PoorlyFormattedToken(format!("claims: {e}")))?;
        let claims: SessionClaims =
            serde_json::from_slice(&json).map_err(|e| AuthError::PoorlyFormattedToken(format!("claims: {e}")))?;
        if claims.is_expired() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

/// Reads the raw session token from the request header, falling back to the cookie.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .or_else(|| req.cookie(SESSION_HEADER).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty())
}

/// Authenticates a request. Claims already validated by the ACL middleware are reused.
pub fn authenticate(req: &HttpRequest) -> Result<SessionClaims, ServerError> {
    if let Some(claims) = req.extensions().get::<SessionClaims>() {
        return Ok(claims.clone());
    }
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::ConfigurationError("No token issuer has been configured".into()))?;
    let token = session_token(req).ok_or(AuthError::MissingToken)?;
    let claims = issuer.verify_token(&token).map_err(|e| {
        debug!("🔐️ Rejected session token. {e}");
        e
    })?;
    trace!("🔐️ Authenticated user #{}", claims.user_id);
    req.extensions_mut().insert(claims.clone());
    Ok(claims)
}

impl FromRequest for SessionClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
