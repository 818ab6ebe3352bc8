use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::signature::{OutputEncoding, SignatureResult, SignatureScheme};

// -- Service token claims --

/// JWT claims presented by internal services calling the signing API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub service: String,
    pub exp: usize,
}

// -- Signing --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignRequest {
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedUrlRequest {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignedUrlResponse {
    pub method: String,
    pub url: String,
    pub signature: SignatureResult,
}

// -- Brokers --

/// Public view of a configured broker. Never carries credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSummary {
    pub name: String,
    pub scheme: SignatureScheme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<OutputEncoding>,
    pub base_url: String,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
