/// Shared data shapes for TradeHall broker signing.
///
/// `params` and `signature` are the signer's input and output records;
/// `api` holds the JSON bodies exchanged with the internal signing service.

pub mod api;
pub mod params;
pub mod signature;

pub use params::{NonScalarParam, ParamValue, SignableParams};
pub use signature::{OutputEncoding, SignatureResult, SignatureScheme, UnknownVariant};
