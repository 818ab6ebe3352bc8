use std::fmt;

use reqwest::Url;
use tradehall_signer::{SIGN_FIELD, SignatureScheme};

use crate::error::BrokerError;

pub const DEFAULT_API_KEY_HEADER: &str = "X-API-KEY";

/// Where the signature travels on the outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignaturePlacement {
    /// Appended to the query string as `field=<signature>`.
    Query { field: String },
    /// Sent in a request header.
    Header { name: String },
}

impl SignaturePlacement {
    /// `signature` for the timestamp scheme, `sign` for the digest scheme.
    pub fn default_for(scheme: SignatureScheme) -> Self {
        let field = match scheme {
            SignatureScheme::Timestamp => "signature",
            SignatureScheme::Digest => SIGN_FIELD,
        };
        Self::Query { field: field.to_string() }
    }
}

/// Static description of one broker endpoint.
#[derive(Clone)]
pub struct BrokerProfile {
    pub name: String,
    pub base_url: Url,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub placement: SignaturePlacement,
}

impl BrokerProfile {
    pub fn new(
        name: impl Into<String>,
        base_url: &str,
        scheme: SignatureScheme,
    ) -> Result<Self, BrokerError> {
        let base_url = Url::parse(base_url).map_err(|e| BrokerError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BrokerError::InvalidUrl(format!("{} cannot be a base url", base_url)));
        }
        Ok(Self {
            name: name.into(),
            base_url,
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            placement: SignaturePlacement::default_for(scheme),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    pub fn with_placement(mut self, placement: SignaturePlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Join an endpoint path onto the base url, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_query(None);
        url
    }
}

// API keys stay out of logs.
impl fmt::Debug for BrokerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerProfile")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_header", &self.api_key_header)
            .field("placement", &self.placement)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_placement_follows_scheme() {
        assert_eq!(
            SignaturePlacement::default_for(SignatureScheme::Timestamp),
            SignaturePlacement::Query { field: "signature".into() }
        );
        assert_eq!(
            SignaturePlacement::default_for(SignatureScheme::Digest),
            SignaturePlacement::Query { field: "sign".into() }
        );
    }

    #[test]
    fn endpoint_keeps_base_prefix() {
        let profile =
            BrokerProfile::new("alpha", "https://api.alpha.example/v2/", SignatureScheme::Digest).unwrap();
        assert_eq!(
            profile.endpoint("/account/balance").as_str(),
            "https://api.alpha.example/v2/account/balance"
        );

        let bare = BrokerProfile::new("beta", "https://api.beta.example", SignatureScheme::Digest).unwrap();
        assert_eq!(bare.endpoint("orders").as_str(), "https://api.beta.example/orders");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(BrokerProfile::new("x", "not a url", SignatureScheme::Timestamp).is_err());
        assert!(BrokerProfile::new("x", "mailto:ops@example.com", SignatureScheme::Timestamp).is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let profile = BrokerProfile::new("alpha", "https://api.alpha.example", SignatureScheme::Timestamp)
            .unwrap()
            .with_api_key("pk_live_123");
        assert!(!format!("{:?}", profile).contains("pk_live_123"));
    }
}
