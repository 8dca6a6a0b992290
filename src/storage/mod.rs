//! Key-value persistence consumed by the vault session.
//!
//! This module provides:
//! - The `StorageAdapter` trait the session reads from and writes through
//! - `MemoryStorage`, a volatile map (tests, embedding)
//! - `FileStorage`, a JSON file written atomically (`file`)
//!
//! Adapters are treated as durable and single-writer.  Nothing assumes
//! atomicity across keys, which is why the session keeps everything that
//! must change together under one key.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::errors::Result;

/// Durable byte store addressed by string keys.
///
/// Failures are reported as `VaultError::StorageUnavailable`; retrying is
/// up to the caller.
pub trait StorageAdapter {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

impl<T: StorageAdapter + ?Sized> StorageAdapter for &mut T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<T: StorageAdapter + ?Sized> StorageAdapter for Box<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }
}
