//! Webhook payload signatures
//!
//! Deliveries to subscriptions with a secret carry
//! `sha256=<hex HMAC-SHA256(secret, body)>`. These helpers let operators
//! reproduce and check that value.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{ConsoleError, Result};

pub const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature header value for `payload`
pub fn sign(secret: &str, payload: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(ConsoleError::validation("secret must not be empty"));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ConsoleError::validation(format!("invalid secret: {}", e)))?;
    mac.update(payload.as_bytes());

    Ok(format!("{}{}", SIGNATURE_PREFIX, hex_encode(&mac.finalize().into_bytes())))
}

/// Check `header` against `payload` in constant time
///
/// Surrounding whitespace on the header is ignored.
pub fn verify(secret: &str, payload: &str, header: &str) -> Result<bool> {
    let header = header.trim();
    if !header.starts_with(SIGNATURE_PREFIX) {
        return Ok(false);
    }
    let expected = sign(secret, payload)?;
    Ok(expected.as_bytes().ct_eq(header.as_bytes()).into())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
