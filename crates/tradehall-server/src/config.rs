use std::sync::Arc;

use thiserror::Error;
use zeroize::Zeroizing;

use tradehall_api::state::BrokerRegistry;
use tradehall_broker::{BrokerClient, BrokerProfile, SignaturePlacement};
use tradehall_signer::{
    DigestSigner, OutputEncoding, RequestSigner, SignFieldPolicy, SignatureScheme, TimestampSigner,
};

/// Placeholder service secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(String),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: String, reason: String },

    #[error("TRADEHALL_SERVICE_SECRET is unset or still a placeholder")]
    PlaceholderSecret,

    #[error("broker '{0}' is configured twice")]
    DuplicateBroker(String),
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub service_secret: String,
    pub brokers: Vec<BrokerConfig>,
}

/// One broker's credentials and transport settings.
pub struct BrokerConfig {
    pub name: String,
    pub scheme: SignatureScheme,
    pub secret: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_header: Option<String>,
    pub signature_header: Option<String>,
    pub encoding: OutputEncoding,
    pub sign_field: SignFieldPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let service_secret = get("TRADEHALL_SERVICE_SECRET").unwrap_or_default();
        if service_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&service_secret.as_str()) {
            return Err(ConfigError::PlaceholderSecret);
        }

        let host = get("TRADEHALL_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match get("TRADEHALL_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| invalid("TRADEHALL_PORT", e))?,
            None => 3100,
        };

        let mut brokers = Vec::new();
        let names = get("TRADEHALL_BROKERS").unwrap_or_default();
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            brokers.push(BrokerConfig::from_lookup(name, &get)?);
        }

        Ok(Self { host, port, service_secret, brokers })
    }
}

impl BrokerConfig {
    fn from_lookup<G>(name: &str, get: &G) -> Result<Self, ConfigError>
    where
        G: Fn(&str) -> Option<String>,
    {
        let prefix = format!("TRADEHALL_BROKER_{}_", name.to_ascii_uppercase().replace('-', "_"));
        let key = |suffix: &str| format!("{}{}", prefix, suffix);
        let required = |suffix: &str| get(&key(suffix)).ok_or_else(|| ConfigError::Missing(key(suffix)));

        let scheme = required("SCHEME")?
            .parse::<SignatureScheme>()
            .map_err(|e| invalid(&key("SCHEME"), e))?;
        let encoding = match get(&key("ENCODING")) {
            Some(raw) => raw.parse::<OutputEncoding>().map_err(|e| invalid(&key("ENCODING"), e))?,
            None => OutputEncoding::default(),
        };
        let sign_field = match get(&key("SIGN_FIELD")) {
            Some(raw) => raw.parse::<SignFieldPolicy>().map_err(|e| invalid(&key("SIGN_FIELD"), e))?,
            None => SignFieldPolicy::default(),
        };

        Ok(Self {
            name: name.to_ascii_lowercase(),
            scheme,
            secret: required("SECRET")?,
            base_url: required("BASE_URL")?,
            api_key: get(&key("API_KEY")),
            api_key_header: get(&key("API_KEY_HEADER")),
            signature_header: get(&key("SIGNATURE_HEADER")),
            encoding,
            sign_field,
        })
    }

    /// Construct the signer and client. The plain secret is zeroed once the
    /// signer holds its own copy.
    pub fn into_client(self) -> anyhow::Result<(BrokerClient, Option<OutputEncoding>)> {
        let secret = Zeroizing::new(self.secret);

        let encoding = match self.scheme {
            SignatureScheme::Timestamp => None,
            SignatureScheme::Digest => Some(self.encoding),
        };
        let signer: Arc<dyn RequestSigner> = match self.scheme {
            SignatureScheme::Timestamp => Arc::new(TimestampSigner::new(secret.as_bytes())?),
            SignatureScheme::Digest => Arc::new(
                DigestSigner::new(secret.as_bytes())?
                    .with_encoding(self.encoding)
                    .with_sign_field(self.sign_field),
            ),
        };

        let mut profile = BrokerProfile::new(&self.name, &self.base_url, self.scheme)?;
        if let Some(api_key) = self.api_key {
            profile = profile.with_api_key(api_key);
        }
        if let Some(header) = self.api_key_header {
            profile = profile.with_api_key_header(header);
        }
        if let Some(name) = self.signature_header {
            profile = profile.with_placement(SignaturePlacement::Header { name });
        }

        Ok((BrokerClient::new(profile, signer), encoding))
    }
}

/// Build the broker registry, sharing one HTTP connection pool.
pub fn build_registry(brokers: Vec<BrokerConfig>) -> anyhow::Result<BrokerRegistry> {
    let http = reqwest::Client::new();
    let mut registry = BrokerRegistry::new();
    for broker in brokers {
        let name = broker.name.clone();
        let (client, encoding) = broker.into_client()?;
        if !registry.register(client.with_http(http.clone()), encoding) {
            return Err(ConfigError::DuplicateBroker(name).into());
        }
    }
    Ok(registry)
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid { key: key.to_string(), reason: reason.to_string() }
}
