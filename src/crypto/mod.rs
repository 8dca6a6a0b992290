//! Cryptographic primitives for Velano.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - AES-256-GCM sealing and opening of serialized structures (`envelope`)
//! - The cheap password verifier (`verifier`)
//! - Recovery key, password and passphrase generation (`recovery`, `generator`)

pub mod envelope;
pub mod generator;
pub mod kdf;
pub mod recovery;
pub mod verifier;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, ...};
pub use envelope::{open, seal, Envelope, IV_LEN};
pub use generator::{generate_passphrase, generate_password, PassphraseOptions, PasswordOptions};
pub use kdf::{derive_key, generate_salt, DerivedKey, DEFAULT_ITERATIONS, MIN_ITERATIONS, SALT_LEN};
pub use recovery::RecoveryKey;
pub use verifier::{check_password, compute_verifier};
