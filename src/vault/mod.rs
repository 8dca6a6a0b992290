//! Vault module: items, the sealed account record, and the lock state machine.
//!
//! This module provides:
//! - `VaultItem`, `ItemDraft`, `ItemUpdate` (`item`)
//! - The `Vault` aggregate and its search filter (`model`)
//! - The persisted `VaultCredentials` record (`credentials`)
//! - Save proposals from form detection (`proposal`)
//! - The biometric key escrow seam (`biometric`)
//! - `VaultSession`, the Uninitialized/Locked/Unlocked machine (`session`)

pub mod biometric;
pub mod credentials;
pub mod item;
pub mod model;
pub mod proposal;
pub mod session;

// Re-export the most commonly used items.
pub use biometric::{KeyEscrow, MemoryEscrow, UserVerification};
pub use credentials::{VaultCredentials, CREDENTIALS_KEY};
pub use item::{ItemDraft, ItemId, ItemKind, ItemUpdate, VaultItem};
pub use model::{ItemFilter, Vault, SCHEMA_VERSION};
pub use proposal::SaveProposal;
pub use session::{SessionPolicy, VaultSession, VaultStatus};
