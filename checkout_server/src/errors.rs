use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use checkout_engine::{CartApiError, CheckoutDbError, CheckoutFlowError, OrderApiError, ProviderError, StoreApiError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("{0}")]
    Conflict(String),
    #[error("The payment provider could not process the request. {0}")]
    PaymentProviderError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::Expired => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PaymentProviderError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("💻️ {self}");
        }
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No session token was provided.")]
    MissingToken,
    #[error("Session token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Session token has expired.")]
    Expired,
    #[error("Session token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<CheckoutDbError> for ServerError {
    fn from(e: CheckoutDbError) -> Self {
        match e {
            CheckoutDbError::OrderNotFound(_) |
            CheckoutDbError::ProductNotFound(_) |
            CheckoutDbError::UserNotFound(_) |
            CheckoutDbError::CartItemNotFound(_) |
            CheckoutDbError::AddressNotFound(_) => Self::NoRecordFound(e.to_string()),
            CheckoutDbError::InvalidQuantity(_) => Self::InvalidRequestBody(e.to_string()),
            CheckoutDbError::OrderAlreadyExists(_) => Self::Conflict(e.to_string()),
            e => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<ProviderError> for ServerError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Configuration(_) | ProviderError::Signing(_) => Self::ConfigurationError(e.to_string()),
            ProviderError::Transport(_) | ProviderError::Rejected(_) => Self::PaymentProviderError(e.to_string()),
        }
    }
}

impl From<CheckoutFlowError> for ServerError {
    fn from(e: CheckoutFlowError) -> Self {
        match e {
            CheckoutFlowError::DatabaseError(e) => e.into(),
            CheckoutFlowError::ProviderError(e) => e.into(),
            CheckoutFlowError::InvalidMobileNumber(_) |
            CheckoutFlowError::EmptyCart |
            CheckoutFlowError::InvalidAmount(_) |
            CheckoutFlowError::AmountMismatch { .. } |
            CheckoutFlowError::OrderModificationNoOp |
            CheckoutFlowError::OrderModificationForbidden { .. } => Self::InvalidRequestBody(e.to_string()),
            CheckoutFlowError::AddressNotFound(_) | CheckoutFlowError::OrderNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            CheckoutFlowError::OrderModificationConflict(_) => Self::Conflict(e.to_string()),
        }
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::DatabaseError(e) => e.into(),
            CartApiError::ProductNotFound(_) | CartApiError::CartItemNotFound(_) => Self::NoRecordFound(e.to_string()),
            CartApiError::InvalidQuantity(_) | CartApiError::PricingError(_) => Self::InvalidRequestBody(e.to_string()),
        }
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::DatabaseError(e) => e.into(),
            OrderApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
        }
    }
}

impl From<StoreApiError> for ServerError {
    fn from(e: StoreApiError) -> Self {
        match e {
            StoreApiError::DatabaseError(e) => e.into(),
            StoreApiError::InvalidProduct(_) | StoreApiError::InvalidAddress(_) => {
                Self::InvalidRequestBody(e.to_string())
            },
            StoreApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
        }
    }
}
