//! Opaque snapshot persistence.

use std::{collections::BTreeMap, sync::RwLock};

use serde::{Serialize, de::DeserializeOwned};

/// Errors raised by a snapshot store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying storage I/O failed.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Logical name is not usable as a key.
    #[error("invalid snapshot name: {0}")]
    InvalidName(String),

    /// The store's lock was poisoned by a panicking writer.
    #[error("snapshot store lock poisoned")]
    Poisoned,
}

/// Save/load pair for opaque blobs keyed by a logical name.
pub trait SnapshotStore: Send + Sync {
    /// Store `blob` under `name`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the blob cannot be written.
    fn put(&self, name: &str, blob: &[u8]) -> Result<(), StoreError>;

    /// Fetch the blob stored under `name`.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the storage cannot be read.
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Serialize `value` and store it under `name`.
///
/// # Errors
/// Returns [`StoreError`] on encoding or storage failure.
pub fn save_snapshot<S, T>(store: &S, name: &str, value: &T) -> Result<(), StoreError>
where
    S: SnapshotStore + ?Sized,
    T: Serialize,
{
    let blob = serde_json::to_vec(value)?;
    store.put(name, &blob)
}

/// Load and decode the value stored under `name`.
///
/// # Errors
/// Returns [`StoreError`] on storage or decoding failure.
pub fn load_snapshot<S, T>(store: &S, name: &str) -> Result<Option<T>, StoreError>
where
    S: SnapshotStore + ?Sized,
    T: DeserializeOwned,
{
    store.get(name)?.map(|blob| serde_json::from_slice(&blob)).transpose().map_err(Into::into)
}

/// In-process snapshot store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn put(&self, name: &str, blob: &[u8]) -> Result<(), StoreError> {
        let mut blobs = self.blobs.write().map_err(|_| StoreError::Poisoned)?;
        blobs.insert(name.to_string(), blob.to_vec());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let blobs = self.blobs.read().map_err(|_| StoreError::Poisoned)?;
        Ok(blobs.get(name).cloned())
    }
}
