//! The persisted, non-secret account record.
//!
//! Stored as one JSON document so every field changes together:
//!
//! ```text
//! { "salt": b64[16], "iterations": u32, "verifier": b64[32],
//!   "iv": b64[12], "cipherText": b64[..] }
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::envelope::{Envelope, IV_LEN};
use crate::crypto::kdf::SALT_LEN;
use crate::errors::{Result, VaultError};

/// Storage key under which the record lives.
pub const CREDENTIALS_KEY: &str = "vault.credentials";

/// Decoded length of a verifier (SHA-256 output).
const VERIFIER_LEN: usize = 32;

/// Salt, cost, verifier and sealed vault for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultCredentials {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    pub iterations: u32,

    /// Base64 password verifier.
    pub verifier: String,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub iv: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub cipher_text: Vec<u8>,
}

impl VaultCredentials {
    pub fn new(salt: &[u8], iterations: u32, verifier: String, envelope: &Envelope) -> Self {
        Self {
            salt: salt.to_vec(),
            iterations,
            verifier,
            iv: envelope.iv.to_vec(),
            cipher_text: envelope.cipher_text.clone(),
        }
    }

    /// The same account with a new sealed vault.
    pub fn with_envelope(&self, envelope: &Envelope) -> Self {
        Self::new(&self.salt, self.iterations, self.verifier.clone(), envelope)
    }

    /// The stored IV + ciphertext.
    pub fn envelope(&self) -> Envelope {
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&self.iv);
        Envelope {
            iv,
            cipher_text: self.cipher_text.clone(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| VaultError::SerializationError(format!("credentials: {e}")))
    }

    /// Parse and sanity-check a stored record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let record: Self = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::InvalidVaultFormat(format!("credentials JSON: {e}")))?;

        if record.salt.len() != SALT_LEN {
            return Err(VaultError::InvalidVaultFormat(format!(
                "salt must be {SALT_LEN} bytes, found {}",
                record.salt.len()
            )));
        }
        if record.iv.len() != IV_LEN {
            return Err(VaultError::InvalidVaultFormat(format!(
                "iv must be {IV_LEN} bytes, found {}",
                record.iv.len()
            )));
        }
        let verifier_len = BASE64
            .decode(&record.verifier)
            .map_err(|e| VaultError::InvalidVaultFormat(format!("verifier: {e}")))?
            .len();
        if verifier_len != VERIFIER_LEN {
            return Err(VaultError::InvalidVaultFormat(format!(
                "verifier must be {VERIFIER_LEN} bytes, found {verifier_len}"
            )));
        }

        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
