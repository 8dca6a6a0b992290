use thiserror::Error;
use uuid::Uuid;

/// All errors that can occur in Velano.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Key derivation input errors ---
    #[error("Salt must be exactly {expected} bytes (got {actual})")]
    InvalidSalt { expected: usize, actual: usize },

    #[error("Iteration count must be at least {minimum} (got {actual})")]
    InvalidIterations { minimum: u32, actual: u32 },

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Unlock errors ---
    #[error("Wrong master password")]
    WrongPassword,

    #[error("Vault data is corrupted: the password was accepted but the vault could not be opened")]
    VaultCorrupted,

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Storage errors ---
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Unsupported vault schema version {0}")]
    UnsupportedSchema(u32),

    // --- Lifecycle errors ---
    #[error("An account already exists in this storage location")]
    AccountExists,

    #[error("No account found: run `velano init` first")]
    NoAccount,

    #[error("Vault is locked")]
    Locked,

    #[error("Vault is already unlocked")]
    AlreadyUnlocked,

    // --- Item errors ---
    #[error("Item {0} not found")]
    ItemNotFound(Uuid),

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    #[error("No pending save proposal at position {0}")]
    ProposalNotFound(usize),

    // --- Biometric errors ---
    #[error("Biometric unlock is not enrolled for this vault")]
    BiometricNotEnrolled,

    #[error("Biometric verification was not confirmed")]
    BiometricRejected,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Password mismatch: passwords do not match")]
    PasswordMismatch,
}

/// Convenience type alias for Velano results.
pub type Result<T> = std::result::Result<T, VaultError>;
