use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use tradehall_broker::BrokerError;
use tradehall_signer::SignError;
use tradehall_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SignError> for ApiError {
    fn from(e: SignError) -> Self {
        match &e {
            SignError::Configuration(reason) => {
                error!("broker signer misconfigured: {}", reason);
                Self::Internal("broker signer is misconfigured".into())
            }
            SignError::Validation { .. } => Self::Unprocessable(e.to_string()),
        }
    }
}

/// Unreadable or mistyped request bodies are reported like any other bad input.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Unprocessable(rejection.body_text())
    }
}

impl From<BrokerError> for ApiError {
    fn from(e: BrokerError) -> Self {
        match e {
            BrokerError::Sign(e) => e.into(),
            BrokerError::InvalidUrl(msg) => Self::Unprocessable(msg),
            BrokerError::Http(e) => Self::BadGateway(e.to_string()),
            BrokerError::Status { status, .. } => {
                Self::BadGateway(format!("broker responded with {}", status))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
