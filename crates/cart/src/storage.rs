//! Durable key-value storage for the persisted cart.
//!
//! The cart is mirrored into a single named slot. [`FileStore`] keeps one file
//! per key inside a directory and replaces values atomically (write to a temp
//! file, then rename over the target), so a reader never sees a half-written
//! cart. [`MemoryStore`] backs tests and embedders that bring their own
//! persistence.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors from reading or writing a storage slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// A synchronous string key-value store.
///
/// `set` must replace the previous value atomically: after it returns, `get`
/// yields exactly the new value, and a failed `set` leaves the old value.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `Ok(None)` if the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] on I/O failure.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] on I/O failure.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed store, one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file holding `key`.
    ///
    /// Keys may contain characters that are not valid in file names
    /// (`@RocketShoes:cart`), so every byte outside `[A-Za-z0-9._-]` is
    /// written as `%XX`. The escape character is itself escaped, so distinct
    /// keys always map to distinct files.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", file_stem(key)))
    }
}

fn file_stem(key: &str) -> String {
    // `.` and `..` would name the directory itself or its parent
    let escape_dots = !key.is_empty() && key.bytes().all(|b| b == b'.');

    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'_' | b'-')
            || (byte == b'.' && !escape_dots);
        if keep {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_err = |source: io::Error| StorageError::Write {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.base_path).map_err(write_err)?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        // Flush the contents before the rename so a crash cannot leave an
        // empty target behind
        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(value.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        fs::rename(&temp_path, &path).map_err(write_err)?;
        sync_dir(&self.base_path).map_err(write_err)?;

        tracing::trace!(path = %path.display(), bytes = value.len(), "Storage slot written");
        Ok(())
    }
}

/// Persist the rename itself.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one key already populated.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
