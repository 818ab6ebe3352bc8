/// Outbound broker transport.
///
/// Signs request params with a `RequestSigner` and places the canonical
/// string, signature and API key on a `reqwest` request the way the broker's
/// profile says to.

pub mod client;
pub mod error;
pub mod profile;

pub use client::BrokerClient;
pub use error::BrokerError;
pub use profile::{BrokerProfile, DEFAULT_API_KEY_HEADER, SignaturePlacement};
