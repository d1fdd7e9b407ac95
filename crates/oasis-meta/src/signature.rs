// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `X-Hub-Signature-256` verification (HMAC-SHA256 of the raw body).

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header Meta puts the body signature in.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Check a `sha256=<hex>` signature header against the body.
///
/// Comparison is constant time. A missing or malformed header fails.
pub fn verify_signature(app_secret: &str, signature_header: Option<&str>, body: &[u8]) -> bool {
    let Some(header) = signature_header.map(str::trim) else {
        return false;
    };
    let Some(digest) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(digest.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the `sha256=<hex>` header value for a body.
pub fn sign(app_secret: &str, body: &[u8]) -> String {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
