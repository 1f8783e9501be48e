//! Slack request-signature verification.
//!
//! Slack signs each request with
//! `v0=hex(hmac_sha256(signing_secret, "v0:<timestamp>:<body>"))` and sends
//! the signature plus the timestamp in headers.  Requests older than the
//! freshness window are rejected to block replays, and the signature
//! comparison is constant-time.

use ring::hmac;

/// Maximum allowed age of a request, in seconds.
const TOLERANCE_SECS: i64 = 300;

/// Compute the `v0=<hex>` signature for a request body.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let mut base = format!("v0:{timestamp}:").into_bytes();
    base.extend_from_slice(body);
    let tag = hmac::sign(&key, &base);

    let mut signature = String::from("v0=");
    for byte in tag.as_ref() {
        signature.push_str(&format!("{byte:02x}"));
    }
    signature
}

/// Verify a request against the provided signature header.
///
/// `now` is the current unix timestamp, passed in so the freshness check is
/// testable.
pub fn verify(secret: &str, timestamp: &str, body: &[u8], provided: &str, now: i64) -> bool {
    let Ok(ts) = timestamp.parse::<i64>() else {
        return false;
    };
    if (now - ts).abs() > TOLERANCE_SECS {
        return false;
    }

    let expected = sign(secret, timestamp, body);
    ring::constant_time::verify_slices_are_equal(expected.as_bytes(), provided.as_bytes()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const BODY: &[u8] = br#"{"type":"event_callback"}"#;

    #[test]
    fn round_trip_verifies() {
        let signature = sign(SECRET, "1720000000", BODY);
        assert!(verify(SECRET, "1720000000", BODY, &signature, 1720000100));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let signature = sign(SECRET, "1720000000", BODY);
        assert!(!verify(
            SECRET,
            "1720000000",
            br#"{"type":"tampered"}"#,
            &signature,
            1720000100
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let signature = sign(SECRET, "1720000000", BODY);
        assert!(!verify(SECRET, "1720000000", BODY, &signature, 1720000000 + 301));
    }

    #[test]
    fn unparseable_timestamp_is_rejected() {
        let signature = sign(SECRET, "1720000000", BODY);
        assert!(!verify(SECRET, "not-a-number", BODY, &signature, 1720000000));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signature = sign("other-secret", "1720000000", BODY);
        assert!(!verify(SECRET, "1720000000", BODY, &signature, 1720000000));
    }
}
