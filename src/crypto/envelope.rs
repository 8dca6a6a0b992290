//! AES-256-GCM envelope around a serialized structure.
//!
//! `seal` serializes the value to JSON, draws a fresh random 96-bit IV and
//! encrypts.  `open` reverses that.  Every failure inside `open` (bad tag,
//! wrong key, truncated data, plaintext that is not the expected shape)
//! collapses into `VaultError::DecryptionFailed`.

use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use super::kdf::DerivedKey;
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM IV in bytes.
pub const IV_LEN: usize = 12;

/// Size of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// The IV + ciphertext pair produced by sealing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; IV_LEN],
    /// Ciphertext with the 16-byte tag appended.
    pub cipher_text: Vec<u8>,
}

/// Serialize `plaintext` and encrypt it under `key` with a fresh IV.
pub fn seal<T: Serialize>(key: &DerivedKey, plaintext: &T) -> Result<Envelope> {
    let encoded = Zeroizing::new(
        serde_json::to_vec(plaintext)
            .map_err(|e| VaultError::SerializationError(format!("vault: {e}")))?,
    );

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let cipher_text = key
        .cipher()
        .encrypt(&nonce, encoded.as_slice())
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&nonce);

    Ok(Envelope { iv, cipher_text })
}

/// Decrypt an envelope and parse the plaintext back into `T`.
pub fn open<T: DeserializeOwned>(key: &DerivedKey, envelope: &Envelope) -> Result<T> {
    if envelope.cipher_text.len() < TAG_LEN {
        return Err(VaultError::DecryptionFailed);
    }

    let nonce = Nonce::from_slice(&envelope.iv);
    let plaintext = Zeroizing::new(
        key.cipher()
            .decrypt(nonce, envelope.cipher_text.as_slice())
            .map_err(|_| VaultError::DecryptionFailed)?,
    );

    serde_json::from_slice(&plaintext).map_err(|_| VaultError::DecryptionFailed)
}
