//! Webhook signature verification.
//!
//! The platform signs every delivery with HMAC-SHA1 over the raw
//! request body, keyed by the app secret, and sends the hex digest in
//! `X-Hub-Signature`. Verification must run on the exact bytes
//! received, before any JSON parsing.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;

use crate::error::WebhookError;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_PREFIX: &str = "sha1=";

fn mac_for(app_secret: &SecretString) -> HmacSha1 {
    HmacSha1::new_from_slice(app_secret.expose_secret().as_bytes())
        .expect("HMAC accepts keys of any length")
}

/// Check an `X-Hub-Signature` header against the raw body. The digest
/// comparison is constant-time.
pub fn verify(
    app_secret: &SecretString,
    header: Option<&str>,
    body: &[u8],
) -> Result<(), WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;
    let hex_digest = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or_else(|| WebhookError::MalformedSignature(header.to_string()))?;
    let expected =
        hex::decode(hex_digest).map_err(|_| WebhookError::MalformedSignature(header.to_string()))?;

    let mut mac = mac_for(app_secret);
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| WebhookError::SignatureMismatch)
}

/// Produce the header value the platform would send for `body`.
pub fn sign(app_secret: &SecretString, body: &[u8]) -> String {
    let mut mac = mac_for(app_secret);
    mac.update(body);
    format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value)
    }

    #[test]
    fn matches_the_rfc_2202_reference_digest() {
        // RFC 2202 test case 2.
        let signed = sign(&secret("Jefe"), b"what do ya want for nothing?");
        assert_eq!(signed, "sha1=effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
    }

    #[test]
    fn accepts_a_signature_it_produced() {
        let app_secret = secret("app-secret");
        let body = br#"{"object":"page","entry":[]}"#;

        let header = sign(&app_secret, body);
        assert!(verify(&app_secret, Some(&header), body).is_ok());
    }

    #[test]
    fn rejects_a_tampered_body() {
        let app_secret = secret("app-secret");
        let header = sign(&app_secret, b"original");

        let err = verify(&app_secret, Some(&header), b"tampered").unwrap_err();
        assert!(matches!(err, WebhookError::SignatureMismatch));
    }

    #[test]
    fn rejects_the_wrong_secret() {
        let header = sign(&secret("right"), b"body");
        let err = verify(&secret("wrong"), Some(&header), b"body").unwrap_err();
        assert!(matches!(err, WebhookError::SignatureMismatch));
    }

    #[test]
    fn missing_header_is_its_own_error() {
        let err = verify(&secret("s"), None, b"body").unwrap_err();
        assert!(matches!(err, WebhookError::MissingSignature));
    }

    #[test]
    fn malformed_headers_are_rejected_before_hashing() {
        let app_secret = secret("s");

        let err = verify(&app_secret, Some("md5=abcdef"), b"body").unwrap_err();
        assert!(matches!(err, WebhookError::MalformedSignature(_)));

        let err = verify(&app_secret, Some("sha1=not-hex"), b"body").unwrap_err();
        assert!(matches!(err, WebhookError::MalformedSignature(_)));
    }
}
