//! Key-value blob stores backing the engine.
//!
//! The engine only ever reads and rewrites whole values under a handful of
//! fixed keys. Atomicity of a single `write` is the store's job.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{EngineError, ResultEngine};

/// Logical key of the trip history collection.
pub const TRIP_HISTORY_KEY: &str = "trip_history";
/// Logical key of the principal directory.
pub const USERS_KEY: &str = "users";
/// Logical key of the logged-in principal.
pub const SESSION_KEY: &str = "session";
/// Logical key of the held exchange rate.
pub const EXCHANGE_RATE_KEY: &str = "exchange_rate";

/// Persistent storage medium, reduced to whole-value reads and writes.
pub trait BlobStore {
    /// Returns `None` when nothing was ever written under `key`.
    fn read(&self, key: &str) -> ResultEngine<Option<String>>;

    /// Replaces the value under `key`.
    fn write(&self, key: &str, value: &str) -> ResultEngine<()>;

    /// Forgets `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> ResultEngine<()>;
}

fn validate_key(key: &str) -> ResultEngine<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(EngineError::Storage(format!("invalid blob key: {key:?}")))
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Clone, Debug)]
pub struct FileBlobStore {
    root_dir: PathBuf,
}

impl FileBlobStore {
    /// Opens (and creates if needed) the data directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> ResultEngine<Self> {
        let root_dir = root_dir.into();
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn path_for(&self, key: &str) -> ResultEngine<PathBuf> {
        validate_key(key)?;
        Ok(self.root_dir.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> ResultEngine<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> ResultEngine<()> {
        let path = self.path_for(key)?;
        let tmp = self.root_dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> ResultEngine<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_blobs<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> ResultEngine<T> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|_| EngineError::Storage("memory store poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> ResultEngine<Option<String>> {
        validate_key(key)?;
        self.with_blobs(|blobs| blobs.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> ResultEngine<()> {
        validate_key(key)?;
        self.with_blobs(|blobs| {
            blobs.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> ResultEngine<()> {
        validate_key(key)?;
        self.with_blobs(|blobs| {
            blobs.remove(key);
        })
    }
}
