use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bridge_engine::BridgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Required fields are missing from the payload: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Webhook signature invalid or not provided")]
    InvalidSignature,
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Payment {transaction_id} could not be delivered to UISP. {message}")]
    PaymentForwardingFailed { transaction_id: String, message: String },
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::MissingFields(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentForwardingFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::MissingFields(fields) => serde_json::json!({ "error": self.to_string(), "fields": fields }),
            Self::PaymentForwardingFailed { transaction_id, .. } => {
                serde_json::json!({ "error": self.to_string(), "transactionId": transaction_id })
            },
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<BridgeError> for ServerError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::Resolve(inner) => Self::NoRecordFound(inner.to_string()),
            BridgeError::ForwardingFailed { transaction_id, message } => {
                Self::PaymentForwardingFailed { transaction_id, message }
            },
            BridgeError::Ledger(inner) => Self::BackendError(inner.to_string()),
            BridgeError::Collaborator(inner) => Self::BackendError(inner.to_string()),
        }
    }
}
