use std::sync::Arc;

use tracing::debug;
use tradehall_types::{OutputEncoding, SignableParams, SignatureResult, SignatureScheme};

use crate::canonical::canonicalize;
use crate::clock::{Clock, SystemClock};
use crate::digest::{encode, hmac_sha256, md5, to_hex};
use crate::error::SignError;
use crate::secret::SecretKey;

/// Field injected by the timestamp scheme.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Field carrying a digest-scheme signature. Never part of the signed string.
pub const SIGN_FIELD: &str = "sign";

/// A broker signing scheme bound to its credentials.
pub trait RequestSigner: Send + Sync {
    fn scheme(&self) -> SignatureScheme;

    fn sign(&self, params: &SignableParams) -> Result<SignatureResult, SignError>;
}

// ── Timestamp scheme ────────────────────────────────────────────────────

/// Injects a millisecond `timestamp` and hex-encodes HMAC-SHA256 over the
/// canonical string. A caller-supplied `timestamp` is overwritten.
pub struct TimestampSigner {
    secret: SecretKey,
    clock: Arc<dyn Clock>,
}

impl TimestampSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignError> {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: impl AsRef<[u8]>, clock: Arc<dyn Clock>) -> Result<Self, SignError> {
        Ok(Self { secret: SecretKey::new(secret)?, clock })
    }
}

impl RequestSigner for TimestampSigner {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Timestamp
    }

    fn sign(&self, params: &SignableParams) -> Result<SignatureResult, SignError> {
        timestamp_signature(&self.secret, params, self.clock.as_ref())
    }
}

/// One-shot timestamp-scheme signature.
pub fn sign_timestamped(
    secret: &str,
    params: &SignableParams,
    clock: &dyn Clock,
) -> Result<SignatureResult, SignError> {
    let secret = SecretKey::new(secret)?;
    timestamp_signature(&secret, params, clock)
}

fn timestamp_signature(
    secret: &SecretKey,
    params: &SignableParams,
    clock: &dyn Clock,
) -> Result<SignatureResult, SignError> {
    // Reject uncoercible values before the clock is read.
    canonicalize(params, &[])?;

    let timestamp = clock.now_millis().to_string();
    let mut stamped = params.clone();
    stamped.insert(TIMESTAMP_FIELD, timestamp.clone());
    let canonical = canonicalize(&stamped, &[])?;

    let signature = to_hex(&hmac_sha256(secret.expose(), canonical.as_bytes()));

    debug!(
        scheme = "timestamp",
        params = params.len(),
        timestamp = %timestamp,
        canonical_len = canonical.len(),
        "signed broker request",
    );

    Ok(SignatureResult {
        scheme: SignatureScheme::Timestamp,
        signature,
        timestamp: Some(timestamp),
        intermediate_digest: None,
        canonical,
    })
}

// ── Digest scheme ───────────────────────────────────────────────────────

/// What the digest scheme does with a `sign` field found in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignFieldPolicy {
    /// Exclude it from the signed string.
    #[default]
    Drop,
    /// Fail with a validation error.
    Reject,
}

impl std::str::FromStr for SignFieldPolicy {
    type Err = tradehall_types::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "reject" => Ok(Self::Reject),
            other => Err(tradehall_types::UnknownVariant {
                kind: "sign field policy",
                value: other.to_string(),
            }),
        }
    }
}

/// HMAC-SHA256 over the uppercase MD5 hex of the canonical string.
///
/// The MD5 step is part of the broker's verification protocol; integrity
/// rests on the outer HMAC.
pub struct DigestSigner {
    secret: SecretKey,
    encoding: OutputEncoding,
    sign_field: SignFieldPolicy,
}

impl DigestSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignError> {
        Ok(Self {
            secret: SecretKey::new(secret)?,
            encoding: OutputEncoding::default(),
            sign_field: SignFieldPolicy::default(),
        })
    }

    pub fn with_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_sign_field(mut self, policy: SignFieldPolicy) -> Self {
        self.sign_field = policy;
        self
    }

    pub fn encoding(&self) -> OutputEncoding {
        self.encoding
    }
}

impl RequestSigner for DigestSigner {
    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Digest
    }

    fn sign(&self, params: &SignableParams) -> Result<SignatureResult, SignError> {
        if self.sign_field == SignFieldPolicy::Reject && matches!(params.get(SIGN_FIELD), Some(Some(_))) {
            return Err(SignError::validation(
                SIGN_FIELD,
                "a previous signature was passed in and is never signed",
            ));
        }
        digest_signature(&self.secret, params, self.encoding)
    }
}

/// One-shot digest-scheme signature. Any `sign` field is dropped.
pub fn sign_digest(
    secret: &str,
    params: &SignableParams,
    encoding: OutputEncoding,
) -> Result<SignatureResult, SignError> {
    let secret = SecretKey::new(secret)?;
    digest_signature(&secret, params, encoding)
}

fn digest_signature(
    secret: &SecretKey,
    params: &SignableParams,
    encoding: OutputEncoding,
) -> Result<SignatureResult, SignError> {
    let canonical = canonicalize(params, &[SIGN_FIELD])?;
    let intermediate = to_hex(&md5(canonical.as_bytes())).to_ascii_uppercase();
    let signature = encode(encoding, &hmac_sha256(secret.expose(), intermediate.as_bytes()));

    debug!(
        scheme = "digest",
        params = params.len(),
        encoding = %encoding,
        canonical_len = canonical.len(),
        "signed broker request",
    );

    Ok(SignatureResult {
        scheme: SignatureScheme::Digest,
        signature,
        timestamp: None,
        intermediate_digest: Some(intermediate),
        canonical,
    })
}
