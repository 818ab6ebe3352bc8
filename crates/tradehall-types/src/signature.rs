use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broker signing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureScheme {
    /// Injected millisecond `timestamp`, hex HMAC-SHA256 over the canonical string.
    Timestamp,
    /// HMAC-SHA256 over the uppercase MD5 hex of the canonical string, `sign` excluded.
    Digest,
}

/// Output encoding for signature bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    #[default]
    Base64,
    Hex,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp => write!(f, "timestamp"),
            Self::Digest => write!(f, "digest"),
        }
    }
}

impl FromStr for SignatureScheme {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp" => Ok(Self::Timestamp),
            "digest" => Ok(Self::Digest),
            other => Err(UnknownVariant { kind: "signature scheme", value: other.to_string() }),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64 => write!(f, "base64"),
            Self::Hex => write!(f, "hex"),
        }
    }
}

impl FromStr for OutputEncoding {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            other => Err(UnknownVariant { kind: "output encoding", value: other.to_string() }),
        }
    }
}

/// Result of one signing call. The caller attaches it to the outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureResult {
    pub scheme: SignatureScheme,
    pub signature: String,
    /// Millisecond timestamp injected into the params (timestamp scheme only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Uppercase MD5 hex that was HMAC'd (digest scheme only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_digest: Option<String>,
    /// Exact string that was signed.
    pub canonical: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_parses_case_insensitively() {
        assert_eq!("Timestamp".parse::<SignatureScheme>().unwrap(), SignatureScheme::Timestamp);
        assert_eq!(" digest ".parse::<SignatureScheme>().unwrap(), SignatureScheme::Digest);
        assert!("rsa".parse::<SignatureScheme>().is_err());
    }

    #[test]
    fn encoding_defaults_to_base64() {
        assert_eq!(OutputEncoding::default(), OutputEncoding::Base64);
        assert_eq!("HEX".parse::<OutputEncoding>().unwrap(), OutputEncoding::Hex);
    }

    #[test]
    fn result_omits_fields_of_other_scheme() {
        let result = SignatureResult {
            scheme: SignatureScheme::Timestamp,
            signature: "ab".into(),
            timestamp: Some("1700000000000".into()),
            intermediate_digest: None,
            canonical: "timestamp=1700000000000".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["scheme"], "timestamp");
        assert_eq!(json["timestamp"], "1700000000000");
        assert!(json.get("intermediate_digest").is_none());
    }
}
