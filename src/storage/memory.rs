//! In-memory storage adapter.

use std::collections::HashMap;

use super::StorageAdapter;
use crate::errors::{Result, VaultError};

/// A `HashMap`-backed store.
///
/// Reads and writes can be switched to fail so callers can exercise
/// their `StorageUnavailable` paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail (or succeed again).
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent `set` fail (or succeed again).
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_reads {
            return Err(VaultError::StorageUnavailable(format!(
                "read of '{key}' failed"
            )));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(VaultError::StorageUnavailable(format!(
                "write of '{key}' failed"
            )));
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
