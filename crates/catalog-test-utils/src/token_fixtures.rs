//! Deterministic token fixtures.
//!
//! Tokens that look plausible but must never authenticate: signed with the
//! wrong key, mutated after signing, already expired, or unsigned.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

/// Signing secret used by [`TestCatalogServer`](crate::TestCatalogServer).
pub const TEST_SECRET: &str = "catalog-test-signing-secret-0123456789abcdef";

/// A different, equally valid secret. Tokens signed with it are forgeries.
pub const FORGED_SECRET: &str = "attacker-controlled-signing-secret-9876543210";

/// Seeded principal.
pub const TEST_USERNAME: &str = "alice";
pub const TEST_PASSWORD: &str = "wonderland";

/// Sign arbitrary claims with HS256 under `secret`.
pub fn sign_claims(secret: &str, claims: &serde_json::Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("HS256 signing with a byte secret cannot fail")
}

/// Well-formed token for `subject`, valid for an hour from `now`, signed
/// with [`FORGED_SECRET`].
pub fn forged_token(subject: &str, now: i64) -> String {
    sign_claims(
        FORGED_SECRET,
        &json!({"sub": subject, "iat": now, "exp": now + 3600}),
    )
}

/// Correctly signed token whose `exp` is an hour before `now`.
pub fn expired_token(subject: &str, now: i64) -> String {
    sign_claims(
        TEST_SECRET,
        &json!({"sub": subject, "iat": now - 7200, "exp": now - 3600}),
    )
}

/// Token with `alg: none` and an empty-ish signature segment.
pub fn unsigned_token(subject: &str, now: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({"sub": subject, "iat": now, "exp": now + 3600}).to_string(),
    );
    format!("{header}.{payload}.{}", URL_SAFE_NO_PAD.encode("none"))
}

/// Change one character in the middle of the payload segment.
pub fn tampered_token(token: &str) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "expected a compact JWS");

    let mut payload: Vec<char> = parts[1].chars().collect();
    let mid = payload.len() / 2;
    payload[mid] = if payload[mid] == 'A' { 'B' } else { 'A' };
    let payload: String = payload.into_iter().collect();

    format!("{}.{}.{}", parts[0], payload, parts[2])
}

/// Re-encode the payload with a different subject, keeping the original
/// header and signature.
pub fn resubjected_token(token: &str, subject: &str, now: i64) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "expected a compact JWS");

    let payload = URL_SAFE_NO_PAD.encode(
        json!({"sub": subject, "iat": now, "exp": now + 3600}).to_string(),
    );
    format!("{}.{}.{}", parts[0], payload, parts[2])
}
