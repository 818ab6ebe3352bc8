use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

use tradehall_types::OutputEncoding;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 (RFC 2104). Any key length is accepted, including empty.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);

    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// MD5 (RFC 1321). Used only as the digest scheme's inner checksum.
pub fn md5(message: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Md5::digest(message));
    out
}

/// Lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Standard alphabet, padded.
pub fn to_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub fn encode(encoding: OutputEncoding, bytes: &[u8]) -> String {
    match encoding {
        OutputEncoding::Base64 => to_base64(bytes),
        OutputEncoding::Hex => to_hex(bytes),
    }
}
