//! File-backed storage adapter.
//!
//! All keys live in one JSON object file, values base64-encoded:
//!
//! ```text
//! { "vault.credentials": "eyJzYWx0Ijoi..." }
//! ```
//!
//! Every `set` rewrites the whole file via temp-file + rename, so readers
//! see either the previous contents or the new ones, never a mix.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use super::StorageAdapter;
use crate::errors::{Result, VaultError};

/// A JSON key-value file on local disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Use the file at `path`.  It does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let data = fs::read(&self.path).map_err(|e| {
            VaultError::StorageUnavailable(format!("cannot read {}: {e}", self.path.display()))
        })?;

        serde_json::from_slice(&data).map_err(|e| {
            VaultError::InvalidVaultFormat(format!("{} is not a store file: {e}", self.path.display()))
        })
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let buf = serde_json::to_vec_pretty(entries)
            .map_err(|e| VaultError::SerializationError(format!("store: {e}")))?;

        // Atomic write: write to a temp file, then rename.
        // The temp file is in the same directory so rename is guaranteed
        // to be atomic on the same filesystem.
        let parent = self.path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        let unavailable =
            |e: std::io::Error| VaultError::StorageUnavailable(format!("{}: {e}", self.path.display()));

        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }
        fs::write(&tmp_path, &buf).map_err(unavailable)?;

        // On Unix, restrict permissions to owner-only read/write.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp_path, perms).map_err(unavailable)?;
        }

        fs::rename(&tmp_path, &self.path).map_err(unavailable)?;
        Ok(())
    }
}

impl StorageAdapter for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.load()?;
        entries
            .get(key)
            .map(|encoded| {
                BASE64.decode(encoded).map_err(|e| {
                    VaultError::InvalidVaultFormat(format!("value for '{key}' is not base64: {e}"))
                })
            })
            .transpose()
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), BASE64.encode(value));
        self.write(&entries)?;
        debug!(key, bytes = value.len(), path = %self.path.display(), "store updated");
        Ok(())
    }
}
