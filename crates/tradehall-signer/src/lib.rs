/// TradeHall broker request signing.
///
/// Two broker schemes are supported:
/// - timestamp: inject a millisecond `timestamp`, hex HMAC-SHA256 over the sorted params
/// - digest: HMAC-SHA256 over the uppercase MD5 hex of the sorted params, `sign` excluded
///
/// Everything here is pure and synchronous. Signers are `Send + Sync` and can be
/// shared behind an `Arc`.

pub mod canonical;
pub mod clock;
pub mod digest;
pub mod error;
pub mod secret;
pub mod signer;

pub use canonical::canonicalize;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::SignError;
pub use secret::SecretKey;
pub use signer::{
    DigestSigner, RequestSigner, SIGN_FIELD, SignFieldPolicy, TIMESTAMP_FIELD, TimestampSigner,
    sign_digest, sign_timestamped,
};
pub use tradehall_types::{OutputEncoding, ParamValue, SignableParams, SignatureResult, SignatureScheme};
