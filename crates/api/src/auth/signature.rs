//! HMAC-SHA256 signatures on incoming workflow webhooks.
//!
//! The engine sends `x-mastra-signature: sha256=<hex>` computed over the
//! raw request body with the shared `MASTRA_WEBHOOK_SECRET`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-mastra-signature";

const SIGNATURE_PREFIX: &str = "sha256=";

fn mac_for(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

/// Compute the header value for `body`.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Check a header value against `body` in constant time.
///
/// The `sha256=` prefix is optional. Missing or malformed headers fail.
pub fn verify(secret: &str, body: &[u8], header: Option<&str>) -> bool {
    let Some(header) = header else {
        return false;
    };
    let hex_part = header.trim();
    let hex_part = hex_part.strip_prefix(SIGNATURE_PREFIX).unwrap_or(hex_part);
    let Ok(expected) = hex::decode(hex_part) else {
        return false;
    };

    let mut mac = mac_for(secret);
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
