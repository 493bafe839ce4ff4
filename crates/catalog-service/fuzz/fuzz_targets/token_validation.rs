#![no_main]

use catalog_service::auth::{ManualClock, TokenIssuer, TokenValidator};
use common::jwt::check_compact_format;
use common::secret::SecretString;
use libfuzzer_sys::fuzz_target;
use std::sync::{Arc, OnceLock};

const SECRET: &str = "fuzzing-secret-0123456789abcdef0123456789";
const NOW: i64 = 1_700_000_000;

struct Harness {
    validator: TokenValidator,
    genuine: String,
}

fn harness() -> &'static Harness {
    static HARNESS: OnceLock<Harness> = OnceLock::new();
    HARNESS.get_or_init(|| {
        let secret = SecretString::from(SECRET.to_string());
        let clock = Arc::new(ManualClock::new(NOW));
        let issuer = TokenIssuer::new(&secret, 3600, clock.clone());
        Harness {
            validator: TokenValidator::new(&secret, clock),
            genuine: issuer.issue("alice").map(|t| t.token).unwrap_or_default(),
        }
    })
}

fuzz_target!(|data: &[u8]| {
    let h = harness();

    // Arbitrary input must never panic and must never authenticate
    if let Ok(token) = std::str::from_utf8(data) {
        let _ = check_compact_format(token);
        let _ = h.validator.extract_subject(token);
        let _ = h.validator.extract_expiry(token);
        if token != h.genuine {
            assert!(!h.validator.validate(token, "alice"));
        }
    }

    // Splice fuzz bytes into the genuine token's payload
    if let Some(byte) = data.first() {
        let mut bytes = h.genuine.clone().into_bytes();
        let idx = usize::from(*byte) % bytes.len().max(1);
        if let Some(slot) = bytes.get_mut(idx) {
            let replacement = data.get(1).copied().unwrap_or(b'A');
            if *slot != b'.' && replacement != *slot && replacement.is_ascii_alphanumeric() {
                *slot = replacement;
                if let Ok(mutated) = String::from_utf8(bytes) {
                    assert!(!h.validator.validate(&mutated, "alice"));
                }
            }
        }
    }
});
