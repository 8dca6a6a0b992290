//! Recovery key generation.
//!
//! A recovery key is 32 random bytes rendered as uppercase hex in blocks
//! of four: `A1B2-C3D4-...` (16 blocks, 64 hex digits).  Nothing is kept
//! after generation; storing and showing the key is the caller's job.

use std::fmt;

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of random bytes in a recovery key (256 bits).
pub const RECOVERY_KEY_BYTES: usize = 32;

/// Hex digits per transcription block.
const BLOCK_LEN: usize = 4;

/// Separator between blocks.
pub const BLOCK_SEPARATOR: char = '-';

/// A freshly generated recovery key, as display text.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryKey {
    formatted: String,
}

impl RecoveryKey {
    /// Draw 256 bits from the OS-seeded CSPRNG and format them.
    pub fn generate() -> Self {
        let mut bytes = [0u8; RECOVERY_KEY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    fn from_bytes(bytes: &[u8; RECOVERY_KEY_BYTES]) -> Self {
        let block_count = RECOVERY_KEY_BYTES * 2 / BLOCK_LEN;
        let mut formatted = String::with_capacity(RECOVERY_KEY_BYTES * 2 + block_count - 1);

        for (i, pair) in bytes.chunks(BLOCK_LEN / 2).enumerate() {
            if i > 0 {
                formatted.push(BLOCK_SEPARATOR);
            }
            for byte in pair {
                formatted.push_str(&format!("{byte:02X}"));
            }
        }

        Self { formatted }
    }

    /// The dash-grouped display form.
    pub fn as_str(&self) -> &str {
        &self.formatted
    }

    /// The 64 hex digits without separators.
    pub fn hex_digits(&self) -> String {
        self.formatted
            .chars()
            .filter(|c| *c != BLOCK_SEPARATOR)
            .collect()
    }
}

impl fmt::Display for RecoveryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted)
    }
}

impl fmt::Debug for RecoveryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecoveryKey([REDACTED])")
    }
}
