use thiserror::Error;
use tradehall_signer::SignError;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Sign(#[from] SignError),

    #[error("invalid broker url: {0}")]
    InvalidUrl(String),

    #[error("broker request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("broker returned {status}: {body}")]
    Status { status: u16, body: String },
}
