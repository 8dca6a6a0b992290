//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count is an input, not a constant: it is persisted next
//! to the salt so existing accounts keep the cost they were created with
//! while new accounts pick up `DEFAULT_ITERATIONS`.

use std::fmt;

use aes_gcm::aead::KeyInit;
use aes_gcm::{Aes256Gcm, Key};
use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Result, VaultError};

/// Length of the per-account salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Lowest iteration count accepted for any account, old or new.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Iteration count for newly created accounts (OWASP guidance for
/// PBKDF2-HMAC-SHA256).
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// A 256-bit key derived from the master password.
///
/// The key bytes never leave this type: there is no accessor, no
/// `Serialize` and no `Clone`.  The only things callers can do with it
/// are hand it to the envelope cipher or drop it, at which point the
/// bytes are zeroed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Build the AES-256-GCM cipher keyed with this key.  The cipher's
    /// round keys are wiped when it is dropped.
    pub(crate) fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.bytes))
    }

    /// Copy the key for escrow.  Crate-internal so ordinary callers
    /// cannot multiply live copies of the key.
    pub(crate) fn duplicate(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the vault key from `password`, a 16-byte `salt` and the
/// account's iteration count.
///
/// The same inputs always produce the same key.
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Result<DerivedKey> {
    if salt.len() != SALT_LEN {
        return Err(VaultError::InvalidSalt {
            expected: SALT_LEN,
            actual: salt.len(),
        });
    }
    if iterations < MIN_ITERATIONS {
        return Err(VaultError::InvalidIterations {
            minimum: MIN_ITERATIONS,
            actual: iterations,
        });
    }

    let mut key = DerivedKey {
        bytes: [0u8; KEY_LEN],
    };
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, iterations, &mut key.bytes)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("PBKDF2 failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_wiped_on_drop<T: zeroize::ZeroizeOnDrop>() {}

    #[test]
    fn block_cipher_wipes_round_keys() {
        assert_wiped_on_drop::<aes::Aes256>();
    }

    #[test]
    fn rejects_short_salt() {
        let err = derive_key("pw", &[0u8; 8], DEFAULT_ITERATIONS).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InvalidSalt {
                expected: SALT_LEN,
                actual: 8
            }
        ));
    }

    #[test]
    fn rejects_long_salt() {
        let err = derive_key("pw", &[0u8; 32], DEFAULT_ITERATIONS).unwrap_err();
        assert!(matches!(err, VaultError::InvalidSalt { actual: 32, .. }));
    }

    #[test]
    fn rejects_iterations_below_minimum() {
        let err = derive_key("pw", &[0u8; SALT_LEN], MIN_ITERATIONS - 1).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InvalidIterations {
                minimum: MIN_ITERATIONS,
                ..
            }
        ));
    }

    #[test]
    fn same_inputs_same_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("correct horse", &salt, MIN_ITERATIONS).unwrap();
        let b = derive_key("correct horse", &salt, MIN_ITERATIONS).unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn iteration_count_changes_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("correct horse", &salt, MIN_ITERATIONS).unwrap();
        let b = derive_key("correct horse", &salt, MIN_ITERATIONS + 1).unwrap();
        assert_ne!(a.bytes, b.bytes);
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = derive_key("pw", &[1u8; SALT_LEN], MIN_ITERATIONS).unwrap();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
