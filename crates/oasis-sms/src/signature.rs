// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `X-Twilio-Signature` computation and verification.
//!
//! Twilio signs the full request URL followed by every POST parameter,
//! sorted by name, with each name immediately followed by its value. The
//! HMAC-SHA1 digest is base64 encoded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

/// Header Twilio puts the request signature in.
pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

/// Compute the expected signature for `url` and a form-encoded body.
///
/// Returns `None` when the body is not valid form encoding.
pub fn compute_signature(auth_token: &str, url: &str, form_body: &[u8]) -> Option<String> {
    let mac = signed_mac(auth_token, url, form_body)?;
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Check a signature header against the URL and body. Constant time.
pub fn verify_signature(
    auth_token: &str,
    url: &str,
    signature_header: Option<&str>,
    form_body: &[u8],
) -> bool {
    let Some(Ok(provided)) = signature_header.map(|h| STANDARD.decode(h.trim())) else {
        return false;
    };
    match signed_mac(auth_token, url, form_body) {
        Some(mac) => mac.verify_slice(&provided).is_ok(),
        None => false,
    }
}

fn signed_mac(auth_token: &str, url: &str, form_body: &[u8]) -> Option<Hmac<Sha1>> {
    let mut params: Vec<(String, String)> = serde_urlencoded::from_bytes(form_body).ok()?;
    params.sort();

    let mut mac = Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()).ok()?;
    mac.update(url.as_bytes());
    for (name, value) in &params {
        mac.update(name.as_bytes());
        mac.update(value.as_bytes());
    }
    Some(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://shop.example.com/webhooks/twilio";
    const BODY: &[u8] = b"To=%2B15550100&From=%2B15557777&Body=hello&MessageSid=SM1";

    #[test]
    fn signature_ignores_parameter_order() {
        let reordered = b"Body=hello&MessageSid=SM1&From=%2B15557777&To=%2B15550100";
        assert_eq!(
            compute_signature("tok", URL, BODY),
            compute_signature("tok", URL, reordered)
        );
    }

    #[test]
    fn accepts_correct_signature() {
        let sig = compute_signature("tok", URL, BODY).unwrap();
        assert!(verify_signature("tok", URL, Some(&sig), BODY));
    }

    #[test]
    fn rejects_tampered_body_url_or_token() {
        let sig = compute_signature("tok", URL, BODY).unwrap();
        let tampered = b"To=%2B15550100&From=%2B15557777&Body=HELLO&MessageSid=SM1";
        assert!(!verify_signature("tok", URL, Some(&sig), tampered));
        assert!(!verify_signature("tok", "https://evil.example.com/webhooks/twilio", Some(&sig), BODY));
        assert!(!verify_signature("other", URL, Some(&sig), BODY));
    }

    #[test]
    fn rejects_missing_or_garbage_header() {
        assert!(!verify_signature("tok", URL, None, BODY));
        assert!(!verify_signature("tok", URL, Some("%%%"), BODY));
    }
}
