//! The vault lock/unlock state machine.
//!
//! ```text
//! Uninitialized --create_account--> Locked --unlock--> Unlocking --> Unlocked
//!                                     ^                    |            |
//!                                     +----- failure ------+            |
//!                                     +------------- lock --------------+
//! ```
//!
//! The derived key and the plaintext vault live only inside the
//! `Unlocked` variant.  Leaving that variant drops both, and dropping
//! zeroes the key bytes and every item's secret fields.
//!
//! Each mutation works on a copy of the vault, seals the copy, writes it
//! through the storage adapter and only then swaps it in.  A failed write
//! leaves both the stored record and the in-memory vault at the last
//! committed state.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::biometric::{KeyEscrow, UserVerification};
use super::credentials::{VaultCredentials, CREDENTIALS_KEY};
use super::item::{ItemDraft, ItemId, ItemUpdate, VaultItem};
use super::model::Vault;
use super::proposal::SaveProposal;
use crate::crypto::envelope::{open, seal};
use crate::crypto::kdf::{derive_key, generate_salt, DerivedKey, DEFAULT_ITERATIONS, MIN_ITERATIONS};
use crate::crypto::verifier::{check_password, compute_verifier};
use crate::errors::{Result, VaultError};
use crate::storage::StorageAdapter;

/// Policy knobs the session applies to new key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Iteration count for new accounts and re-keys.
    pub default_iterations: u32,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            default_iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultStatus {
    Uninitialized,
    Locked,
    Unlocking,
    Unlocked,
}

/// Key, record and plaintext held while unlocked.
struct UnlockedVault {
    key: DerivedKey,
    credentials: VaultCredentials,
    vault: Vault,
}

enum State {
    Uninitialized,
    Locked(VaultCredentials),
    Unlocking,
    Unlocked(Box<UnlockedVault>),
}

/// One account's vault over a storage adapter.
pub struct VaultSession<S: StorageAdapter> {
    storage: S,
    policy: SessionPolicy,
    state: State,
    proposals: Vec<SaveProposal>,
}

impl<S: StorageAdapter> fmt::Debug for VaultSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSession")
            .field("status", &self.status())
            .field("pending_proposals", &self.proposals.len())
            .finish_non_exhaustive()
    }
}

impl<S: StorageAdapter> VaultSession<S> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Read the account record (if any) from `storage`.
    ///
    /// Starts `Locked` when a record exists, `Uninitialized` otherwise.
    pub fn open(storage: S, policy: SessionPolicy) -> Result<Self> {
        if policy.default_iterations < MIN_ITERATIONS {
            return Err(VaultError::InvalidIterations {
                minimum: MIN_ITERATIONS,
                actual: policy.default_iterations,
            });
        }

        let state = match storage.get(CREDENTIALS_KEY)? {
            Some(bytes) => State::Locked(VaultCredentials::from_bytes(&bytes)?),
            None => State::Uninitialized,
        };

        Ok(Self {
            storage,
            policy,
            state,
            proposals: Vec::new(),
        })
    }

    pub fn status(&self) -> VaultStatus {
        match self.state {
            State::Uninitialized => VaultStatus::Uninitialized,
            State::Locked(_) => VaultStatus::Locked,
            State::Unlocking => VaultStatus::Unlocking,
            State::Unlocked(_) => VaultStatus::Unlocked,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, State::Unlocked(_))
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// The persisted record, when an account exists.
    pub fn credentials(&self) -> Option<&VaultCredentials> {
        match &self.state {
            State::Locked(credentials) => Some(credentials),
            State::Unlocked(unlocked) => Some(&unlocked.credentials),
            State::Uninitialized | State::Unlocking => None,
        }
    }

    /// `true` when the account's iteration count is below the current
    /// default and a `change_password` would raise it.
    pub fn needs_rekey(&self) -> bool {
        self.credentials()
            .is_some_and(|c| c.iterations < self.policy.default_iterations)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Tear the session down and hand the adapter back.
    pub fn into_storage(self) -> S {
        self.storage
    }

    // ------------------------------------------------------------------
    // Account creation
    // ------------------------------------------------------------------

    /// Create a new account with a fresh salt and the default cost.
    ///
    /// Leaves the session `Locked`; call `unlock` to use the vault.
    pub fn create_account(&mut self, password: &str) -> Result<()> {
        let salt = generate_salt();
        self.create_account_with(password, &salt, self.policy.default_iterations)
    }

    /// Create a new account with explicit salt and iteration count.
    pub fn create_account_with(&mut self, password: &str, salt: &[u8], iterations: u32) -> Result<()> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(VaultError::AccountExists);
        }

        let key = derive_key(password, salt, iterations)?;
        let envelope = seal(&key, &Vault::new())?;
        let verifier = compute_verifier(password, salt);
        let credentials = VaultCredentials::new(salt, iterations, verifier, &envelope);

        self.storage.set(CREDENTIALS_KEY, &credentials.to_bytes()?)?;
        self.state = State::Locked(credentials);

        info!(iterations, "vault account created");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lock / unlock
    // ------------------------------------------------------------------

    /// Unlock with the master password.
    ///
    /// A wrong password is rejected by the verifier before any key
    /// derivation.  If the verifier accepts but the envelope does not open,
    /// the result is `VaultCorrupted`.  On every failure the session stays
    /// `Locked`.
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        let credentials = self.begin_unlock()?;

        let result = if check_password(password, &credentials.salt, &credentials.verifier) {
            derive_key(password, &credentials.salt, credentials.iterations).and_then(|key| {
                open_vault(&key, &credentials)
                    .map(|vault| (key, vault))
                    .map_err(|e| match e {
                        VaultError::DecryptionFailed => VaultError::VaultCorrupted,
                        other => other,
                    })
            })
        } else {
            Err(VaultError::WrongPassword)
        };

        self.finish_unlock(credentials, result)
    }

    /// Unlock with a key released from a caller-owned biometric escrow.
    ///
    /// The assertion alone never unlocks: `escrow` must hold a key and that
    /// key must open the stored envelope.  A key escrowed before the last
    /// `change_password` no longer opens it and fails with
    /// `DecryptionFailed`.
    pub fn unlock_with_biometric(
        &mut self,
        verification: UserVerification,
        escrow: &dyn KeyEscrow,
    ) -> Result<()> {
        if !matches!(self.state, State::Locked(_)) {
            return Err(self.not_locked_error());
        }
        if verification != UserVerification::Verified {
            warn!("biometric assertion not verified");
            return Err(VaultError::BiometricRejected);
        }
        let key = escrow
            .key()
            .map(DerivedKey::duplicate)
            .ok_or(VaultError::BiometricNotEnrolled)?;

        let credentials = self.begin_unlock()?;
        let result = open_vault(&key, &credentials).map(|vault| (key, vault));
        self.finish_unlock(credentials, result)
    }

    /// Drop the key and plaintext vault.  No-op unless unlocked.
    pub fn lock(&mut self) {
        if !self.is_unlocked() {
            return;
        }
        if let State::Unlocked(unlocked) = std::mem::replace(&mut self.state, State::Unlocking) {
            let UnlockedVault {
                key,
                credentials,
                vault,
            } = *unlocked;
            drop(vault);
            drop(key);
            self.state = State::Locked(credentials);
            info!("vault locked");
        }
    }

    fn begin_unlock(&mut self) -> Result<VaultCredentials> {
        match std::mem::replace(&mut self.state, State::Unlocking) {
            State::Locked(credentials) => Ok(credentials),
            other => {
                self.state = other;
                Err(self.not_locked_error())
            }
        }
    }

    fn finish_unlock(
        &mut self,
        credentials: VaultCredentials,
        result: Result<(DerivedKey, Vault)>,
    ) -> Result<()> {
        match result {
            Ok((key, vault)) => {
                debug!(items = vault.len(), "vault opened");
                self.state = State::Unlocked(Box::new(UnlockedVault {
                    key,
                    credentials,
                    vault,
                }));
                info!("vault unlocked");
                Ok(())
            }
            Err(e) => {
                self.state = State::Locked(credentials);
                warn!(error = %e, "unlock failed");
                Err(e)
            }
        }
    }

    fn not_locked_error(&self) -> VaultError {
        match self.state {
            State::Uninitialized => VaultError::NoAccount,
            State::Unlocked(_) => VaultError::AlreadyUnlocked,
            State::Locked(_) | State::Unlocking => VaultError::Locked,
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// The decrypted vault.  Fails with `Locked` unless unlocked.
    pub fn vault(&self) -> Result<&Vault> {
        match &self.state {
            State::Unlocked(unlocked) => Ok(&unlocked.vault),
            _ => Err(VaultError::Locked),
        }
    }

    pub fn item(&self, id: ItemId) -> Result<&VaultItem> {
        self.vault()?.get(id).ok_or(VaultError::ItemNotFound(id))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add an item and persist.  Returns the new item's id.
    pub fn add_item(&mut self, draft: ItemDraft) -> Result<ItemId> {
        let id = self.commit(|vault, now| vault.insert(draft, now))?;
        info!(%id, "item added");
        Ok(id)
    }

    /// Apply a partial update to an item and persist.
    pub fn update_item(&mut self, id: ItemId, update: &ItemUpdate) -> Result<()> {
        self.commit(|vault, now| vault.update(id, update, now))?;
        info!(%id, "item updated");
        Ok(())
    }

    /// Flip an item's favorite flag and persist.  Returns the new value.
    pub fn toggle_favorite(&mut self, id: ItemId) -> Result<bool> {
        let favorite = self.commit(|vault, now| vault.toggle_favorite(id, now))?;
        info!(%id, favorite, "item favorite toggled");
        Ok(favorite)
    }

    /// Remove an item and persist.
    pub fn delete_item(&mut self, id: ItemId) -> Result<()> {
        self.commit(|vault, _| vault.remove(id))?;
        info!(%id, "item deleted");
        Ok(())
    }

    /// Mutate a copy of the vault, seal it, write it, then swap it in.
    fn commit<R>(&mut self, mutate: impl FnOnce(&mut Vault, DateTime<Utc>) -> Result<R>) -> Result<R> {
        let State::Unlocked(unlocked) = &mut self.state else {
            return Err(VaultError::Locked);
        };

        let mut next = unlocked.vault.clone();
        let out = mutate(&mut next, Utc::now())?;

        let envelope = seal(&unlocked.key, &next)?;
        let credentials = unlocked.credentials.with_envelope(&envelope);
        self.storage.set(CREDENTIALS_KEY, &credentials.to_bytes()?)?;

        unlocked.vault = next;
        unlocked.credentials = credentials;
        debug!(items = unlocked.vault.len(), "vault sealed and stored");
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Re-key
    // ------------------------------------------------------------------

    /// Change the master password.
    ///
    /// Draws a new salt, adopts the current default iteration count,
    /// re-derives the key, re-seals the vault and writes the whole record
    /// in one `set`.  Keys escrowed for biometric unlock stop working;
    /// call `enable_biometric` again to re-enroll.
    pub fn change_password(&mut self, current: &str, new_password: &str) -> Result<()> {
        let State::Unlocked(unlocked) = &mut self.state else {
            return Err(VaultError::Locked);
        };
        if !check_password(current, &unlocked.credentials.salt, &unlocked.credentials.verifier) {
            warn!("password change rejected: wrong current password");
            return Err(VaultError::WrongPassword);
        }

        let salt = generate_salt();
        let iterations = self.policy.default_iterations;
        let key = derive_key(new_password, &salt, iterations)?;
        let envelope = seal(&key, &unlocked.vault)?;
        let verifier = compute_verifier(new_password, &salt);
        let credentials = VaultCredentials::new(&salt, iterations, verifier, &envelope);

        self.storage.set(CREDENTIALS_KEY, &credentials.to_bytes()?)?;

        unlocked.key = key;
        unlocked.credentials = credentials;

        info!(iterations, "master password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Biometric enrollment
    // ------------------------------------------------------------------

    /// Deposit a copy of the current key into `escrow`.
    ///
    /// The session keeps no reference to the escrow: the caller owns it,
    /// decides how long it lives, and revokes it to disable biometric
    /// unlock.  Once locked, the session itself holds no key material.
    pub fn enable_biometric(&self, escrow: &mut dyn KeyEscrow) -> Result<()> {
        let State::Unlocked(unlocked) = &self.state else {
            return Err(VaultError::Locked);
        };
        escrow.deposit(unlocked.key.duplicate());
        info!("biometric unlock enabled");
        Ok(())
    }

    /// `true` while a derived key is held by this session.
    pub fn holds_key(&self) -> bool {
        matches!(self.state, State::Unlocked(_))
    }

    // ------------------------------------------------------------------
    // Save proposals
    // ------------------------------------------------------------------

    /// Queue a captured credential for review.  Allowed in any state.
    pub fn propose_save(&mut self, proposal: SaveProposal) {
        debug!(site = proposal.site(), "save proposal queued");
        self.proposals.push(proposal);
    }

    pub fn pending_proposals(&self) -> &[SaveProposal] {
        &self.proposals
    }

    /// Turn a queued proposal into a login item.
    ///
    /// The proposal is removed from the queue only after the item is
    /// persisted.
    pub fn accept_proposal(&mut self, index: usize) -> Result<ItemId> {
        let draft = self
            .proposals
            .get(index)
            .ok_or(VaultError::ProposalNotFound(index))?
            .to_draft();
        let id = self.add_item(draft)?;
        self.proposals.remove(index);
        Ok(id)
    }

    /// Discard a queued proposal.
    pub fn dismiss_proposal(&mut self, index: usize) -> Result<()> {
        if index >= self.proposals.len() {
            return Err(VaultError::ProposalNotFound(index));
        }
        self.proposals.remove(index);
        Ok(())
    }
}

/// Open and validate the stored envelope with `key`.
fn open_vault(key: &DerivedKey, credentials: &VaultCredentials) -> Result<Vault> {
    let vault: Vault = open(key, &credentials.envelope())?;
    vault.validate()?;
    Ok(vault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::SALT_LEN;
    use crate::storage::MemoryStorage;
    use crate::vault::biometric::MemoryEscrow;
    use crate::vault::item::ItemKind;

    fn policy() -> SessionPolicy {
        SessionPolicy {
            default_iterations: MIN_ITERATIONS,
        }
    }

    fn locked_session() -> VaultSession<MemoryStorage> {
        let mut session = VaultSession::open(MemoryStorage::new(), policy()).unwrap();
        session.create_account("master-pw").unwrap();
        session
    }

    fn unlocked_session() -> VaultSession<MemoryStorage> {
        let mut session = locked_session();
        session.unlock("master-pw").unwrap();
        session
    }

    #[test]
    fn starts_uninitialized_on_empty_storage() {
        let session = VaultSession::open(MemoryStorage::new(), policy()).unwrap();
        assert_eq!(session.status(), VaultStatus::Uninitialized);
        assert!(session.credentials().is_none());
    }

    #[test]
    fn policy_below_minimum_is_rejected() {
        let result = VaultSession::open(
            MemoryStorage::new(),
            SessionPolicy {
                default_iterations: 10,
            },
        );
        assert!(matches!(result, Err(VaultError::InvalidIterations { .. })));
    }

    #[test]
    fn create_account_leaves_session_locked() {
        let session = locked_session();
        assert_eq!(session.status(), VaultStatus::Locked);
        assert!(session.vault().is_err());
    }

    #[test]
    fn second_account_is_rejected() {
        let mut session = locked_session();
        assert!(matches!(
            session.create_account("other"),
            Err(VaultError::AccountExists)
        ));
    }

    #[test]
    fn unlock_without_account() {
        let mut session = VaultSession::open(MemoryStorage::new(), policy()).unwrap();
        assert!(matches!(session.unlock("pw"), Err(VaultError::NoAccount)));
        assert_eq!(session.status(), VaultStatus::Uninitialized);
    }

    #[test]
    fn unlock_twice_is_rejected() {
        let mut session = unlocked_session();
        assert!(matches!(
            session.unlock("master-pw"),
            Err(VaultError::AlreadyUnlocked)
        ));
        assert!(session.is_unlocked());
    }

    #[test]
    fn mutations_require_unlock() {
        let mut session = locked_session();
        let result = session.add_item(ItemDraft::new(ItemKind::Note, "n"));
        assert!(matches!(result, Err(VaultError::Locked)));
    }

    #[test]
    fn failed_write_keeps_committed_state() {
        let mut session = unlocked_session();
        session
            .add_item(ItemDraft::new(ItemKind::Login, "kept"))
            .unwrap();
        let stored_before = session.storage().get(CREDENTIALS_KEY).unwrap();

        session.storage.set_fail_writes(true);
        let result = session.add_item(ItemDraft::new(ItemKind::Login, "lost"));
        assert!(matches!(result, Err(VaultError::StorageUnavailable(_))));

        assert_eq!(session.vault().unwrap().len(), 1);
        assert_eq!(session.storage().get(CREDENTIALS_KEY).unwrap(), stored_before);
    }

    #[test]
    fn lock_discards_plaintext() {
        let mut session = unlocked_session();
        session.add_item(ItemDraft::new(ItemKind::Note, "n")).unwrap();
        session.lock();
        assert_eq!(session.status(), VaultStatus::Locked);
        assert!(matches!(session.vault(), Err(VaultError::Locked)));
    }

    #[test]
    fn lock_when_locked_is_noop() {
        let mut session = locked_session();
        session.lock();
        assert_eq!(session.status(), VaultStatus::Locked);
    }

    #[test]
    fn biometric_requires_enrollment() {
        let mut session = locked_session();
        assert!(matches!(
            session.unlock_with_biometric(UserVerification::Verified, &MemoryEscrow::new()),
            Err(VaultError::BiometricNotEnrolled)
        ));
        assert_eq!(session.status(), VaultStatus::Locked);
    }

    #[test]
    fn biometric_unlock_after_enrollment() {
        let mut escrow = MemoryEscrow::new();
        let mut session = unlocked_session();
        session.enable_biometric(&mut escrow).unwrap();
        session.lock();

        assert!(matches!(
            session.unlock_with_biometric(UserVerification::NotVerified, &escrow),
            Err(VaultError::BiometricRejected)
        ));
        assert_eq!(session.status(), VaultStatus::Locked);

        session
            .unlock_with_biometric(UserVerification::Verified, &escrow)
            .unwrap();
        assert!(session.is_unlocked());
    }

    #[test]
    fn locked_session_holds_no_key_after_enrollment() {
        let mut escrow = MemoryEscrow::new();
        let mut session = unlocked_session();
        assert!(session.holds_key());
        session.enable_biometric(&mut escrow).unwrap();

        session.lock();
        assert!(!session.holds_key());
        assert!(matches!(session.state, State::Locked(_)));
        assert!(!format!("{session:?}").contains("key"));
    }

    #[test]
    fn revoked_escrow_cannot_unlock() {
        let mut escrow = MemoryEscrow::new();
        let mut session = unlocked_session();
        session.enable_biometric(&mut escrow).unwrap();
        session.lock();

        escrow.revoke();
        assert!(matches!(
            session.unlock_with_biometric(UserVerification::Verified, &escrow),
            Err(VaultError::BiometricNotEnrolled)
        ));
    }

    #[test]
    fn biometric_state_errors_come_before_assertion() {
        let escrow = MemoryEscrow::new();
        let mut empty = VaultSession::open(MemoryStorage::new(), policy()).unwrap();
        assert!(matches!(
            empty.unlock_with_biometric(UserVerification::NotVerified, &escrow),
            Err(VaultError::NoAccount)
        ));

        let mut session = unlocked_session();
        assert!(matches!(
            session.unlock_with_biometric(UserVerification::NotVerified, &escrow),
            Err(VaultError::AlreadyUnlocked)
        ));
        assert!(session.is_unlocked());
    }

    #[test]
    fn enable_biometric_requires_unlock() {
        let session = locked_session();
        let mut escrow = MemoryEscrow::new();
        assert!(matches!(
            session.enable_biometric(&mut escrow),
            Err(VaultError::Locked)
        ));
        assert!(escrow.key().is_none());
    }

    #[test]
    fn needs_rekey_tracks_policy() {
        let mut storage = MemoryStorage::new();
        {
            let mut session = VaultSession::open(&mut storage, policy()).unwrap();
            session
                .create_account_with("pw", &[1u8; SALT_LEN], MIN_ITERATIONS)
                .unwrap();
            assert!(!session.needs_rekey());
        }
        let stronger = SessionPolicy {
            default_iterations: MIN_ITERATIONS * 2,
        };
        let session = VaultSession::open(&mut storage, stronger).unwrap();
        assert!(session.needs_rekey());
    }

    #[test]
    fn proposals_queue_while_locked() {
        let mut session = locked_session();
        session.propose_save(SaveProposal::new("https://x.io/login", "me", "pw"));
        assert_eq!(session.pending_proposals().len(), 1);
        assert!(matches!(session.accept_proposal(0), Err(VaultError::Locked)));
        assert_eq!(session.pending_proposals().len(), 1);
        assert!(matches!(
            session.dismiss_proposal(3),
            Err(VaultError::ProposalNotFound(3))
        ));
        session.dismiss_proposal(0).unwrap();
        assert!(session.pending_proposals().is_empty());
    }

    #[test]
    fn debug_reveals_no_secrets() {
        let session = unlocked_session();
        let rendered = format!("{session:?}");
        assert!(rendered.contains("Unlocked"));
        assert!(!rendered.contains("master-pw"));
    }
}
