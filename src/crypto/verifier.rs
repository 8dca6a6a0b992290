//! Password verifier: a cheap fingerprint of the master password.
//!
//! `SHA-256(password || base64(salt) || "verifier")`, base64-encoded.
//!
//! The verifier only exists so a wrong password can be rejected before
//! paying for PBKDF2.  It is a single hash, so anyone holding the stored
//! value can brute-force it far faster than the derived key.  It is a UX
//! shortcut and must never be relied on to protect the sealed vault.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Domain-separation tag appended before hashing.
const VERIFIER_TAG: &[u8] = b"verifier";

/// Compute the base64 verifier for `password` under `salt`.
pub fn compute_verifier(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(BASE64.encode(salt).as_bytes());
    hasher.update(VERIFIER_TAG);
    BASE64.encode(hasher.finalize())
}

/// Returns `true` if `password` produces `stored` under `salt`.
pub fn check_password(password: &str, salt: &[u8], stored: &str) -> bool {
    let actual = compute_verifier(password, salt);

    // Use constant-time comparison to avoid timing side channels.
    actual.as_bytes().ct_eq(stored.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];

    #[test]
    fn matches_hand_computed_digest() {
        let mut hasher = Sha256::new();
        hasher.update(b"Tr0ub4dor&3AAECAwQFBgcICQoLDA0ODw==verifier");
        let expected = BASE64.encode(hasher.finalize());

        assert_eq!(compute_verifier("Tr0ub4dor&3", &SALT), expected);
    }

    #[test]
    fn verifier_is_32_bytes() {
        let decoded = BASE64.decode(compute_verifier("pw", &SALT)).unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    fn accepts_correct_password() {
        let stored = compute_verifier("hunter2", &SALT);
        assert!(check_password("hunter2", &SALT, &stored));
    }

    #[test]
    fn rejects_wrong_password() {
        let stored = compute_verifier("hunter2", &SALT);
        assert!(!check_password("hunter3", &SALT, &stored));
        assert!(!check_password("", &SALT, &stored));
    }

    #[test]
    fn salt_changes_verifier() {
        let other_salt = [0xffu8; 16];
        assert_ne!(
            compute_verifier("pw", &SALT),
            compute_verifier("pw", &other_salt)
        );
    }

    #[test]
    fn rejects_truncated_stored_value() {
        let stored = compute_verifier("pw", &SALT);
        assert!(!check_password("pw", &SALT, &stored[..10]));
    }
}
