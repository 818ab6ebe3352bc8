use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SignError;

/// Broker-issued shared secret. Never empty; zeroed on drop; redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignError> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            return Err(SignError::Configuration("secret key is empty".into()));
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}
