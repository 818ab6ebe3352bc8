use thiserror::Error;
use tradehall_types::NonScalarParam;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    /// Missing or empty credentials. Not retryable without operator action.
    #[error("signer misconfigured: {0}")]
    Configuration(String),

    /// A parameter that cannot be signed as given.
    #[error("invalid parameter '{field}': {reason}")]
    Validation { field: String, reason: String },
}

impl SignError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.to_string(), reason: reason.into() }
    }
}

impl From<NonScalarParam> for SignError {
    fn from(e: NonScalarParam) -> Self {
        Self::Validation { field: e.field, reason: "not a scalar value".into() }
    }
}
