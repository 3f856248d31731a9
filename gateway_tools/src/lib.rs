//! REST client for the hosted payment provider.
//!
//! Every request to the provider is signed with a salted SHA-256 checksum (see [`checksum`]). The client exposes two
//! calls: [`GatewayApi::initiate_payment`], which returns the hosted payment page URL, and
//! [`GatewayApi::check_status`], which is the source of truth for whether a transaction was paid.
mod api;
pub mod checksum;
mod config;
mod error;

mod data_objects;

pub use api::GatewayApi;
pub use checksum::{generate_checksum, sign_request, verify_checksum, SignedPayload};
pub use config::GatewayConfig;
pub use data_objects::{
    InstrumentResponse,
    PayPageInstrument,
    PayRequest,
    PayResponse,
    PayResponseData,
    PaymentInstrumentDetail,
    RedirectInfo,
    StatusResponse,
    TransactionStatus,
};
pub use error::GatewayApiError;
