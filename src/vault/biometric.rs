//! Biometric unlock gate.
//!
//! A platform authenticator only says "the user is present"; it never
//! carries key material.  Biometric unlock therefore needs a key that was
//! escrowed while the vault was unlocked, and the session releases that
//! key only after a verified assertion.  How the escrow protects the key
//! between enrollment and use is the escrow's responsibility.

use crate::crypto::kdf::DerivedKey;

/// Outcome reported by the platform authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserVerification {
    Verified,
    NotVerified,
}

impl From<bool> for UserVerification {
    fn from(verified: bool) -> Self {
        if verified {
            UserVerification::Verified
        } else {
            UserVerification::NotVerified
        }
    }
}

/// Holds a copy of the derived key between biometric enrollment and a
/// later biometric unlock.
pub trait KeyEscrow: Send {
    /// Take custody of the key, replacing any previous one.
    fn deposit(&mut self, key: DerivedKey);

    /// The escrowed key, if enrolled.
    fn key(&self) -> Option<&DerivedKey>;

    /// Destroy the escrowed key.
    fn revoke(&mut self);
}

/// Process-lifetime escrow: the key stays in this process's memory until
/// revoked or dropped.  Suitable for a long-lived background process, not
/// for anything that must survive a restart.
#[derive(Debug, Default)]
pub struct MemoryEscrow {
    key: Option<DerivedKey>,
}

impl MemoryEscrow {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyEscrow for MemoryEscrow {
    fn deposit(&mut self, key: DerivedKey) {
        self.key = Some(key);
    }

    fn key(&self) -> Option<&DerivedKey> {
        self.key.as_ref()
    }

    fn revoke(&mut self) {
        // Dropping the key zeroes it.
        self.key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::{derive_key, MIN_ITERATIONS, SALT_LEN};

    #[test]
    fn bool_maps_to_verification() {
        assert_eq!(UserVerification::from(true), UserVerification::Verified);
        assert_eq!(UserVerification::from(false), UserVerification::NotVerified);
    }

    #[test]
    fn memory_escrow_holds_until_revoked() {
        let mut escrow = MemoryEscrow::new();
        assert!(escrow.key().is_none());

        escrow.deposit(derive_key("pw", &[0u8; SALT_LEN], MIN_ITERATIONS).unwrap());
        assert!(escrow.key().is_some());

        escrow.revoke();
        assert!(escrow.key().is_none());
    }
}
