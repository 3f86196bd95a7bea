use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::models::GameList;

/// Namespace key under which the whole list collection is stored.
pub const LISTS_NAMESPACE: &str = "vgo_lists";

/// Root directory under the platform data dir used for list storage.
pub const DEFAULT_DATA_DIR: &str = "vgo";

/// Failures raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing value could not be read.
    #[error("failed to read {key}: {source}")]
    Read {
        /// Namespace key being read.
        key: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The backing value could not be written.
    #[error("failed to write {key}: {source}")]
    Write {
        /// Namespace key being written.
        key: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The stored value is not a list collection.
    #[error("value stored under {key} is not a list collection: {source}")]
    Corrupt {
        /// Namespace key holding the bad value.
        key: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The collection could not be encoded.
    #[error("failed to encode list collection: {0}")]
    Encode(#[source] serde_json::Error),
    /// The backend refuses access (disabled or over quota).
    #[error("storage for {key} is unavailable")]
    Unavailable {
        /// Namespace key that was refused.
        key: String,
    },
}

/// Whole-collection get/set access to persisted lists.
///
/// The underlying store only understands a single value per namespace key,
/// so every write replaces the complete collection.
pub trait ListStorage: Send + Sync {
    /// Load every stored list in stored order.
    fn read_lists(&self) -> Result<Vec<GameList>, StorageError>;

    /// Replace the stored collection.
    fn write_lists(&self, lists: &[GameList]) -> Result<(), StorageError>;
}

fn decode_lists(key: &str, raw: &str) -> Result<Vec<GameList>, StorageError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let lists: Option<Vec<GameList>> =
        serde_json::from_str(raw).map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })?;
    Ok(lists.unwrap_or_default())
}

fn encode_lists(lists: &[GameList]) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec_pretty(lists).map_err(StorageError::Encode)
}

/// Stores the collection as `<root>/<key>.json`.
pub struct JsonFileStorage {
    root: PathBuf,
    key: String,
}

impl JsonFileStorage {
    /// Create storage rooted at the provided directory using the default namespace.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_key(root, LISTS_NAMESPACE)
    }

    /// Create storage under an explicit namespace key.
    pub fn with_key(root: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            key: key.into(),
        }
    }

    /// Default location under the user's data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DATA_DIR)
    }

    /// Path of the JSON file backing this namespace.
    pub fn path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.key))
    }

    fn write_error(&self, source: io::Error) -> StorageError {
        StorageError::Write {
            key: self.key.clone(),
            source,
        }
    }

    fn write_atomically(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let mut file = NamedTempFile::new_in(&self.root)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl ListStorage for JsonFileStorage {
    fn read_lists(&self) -> Result<Vec<GameList>, StorageError> {
        match fs::read_to_string(self.path()) {
            Ok(content) => decode_lists(&self.key, &content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StorageError::Read {
                key: self.key.clone(),
                source,
            }),
        }
    }

    fn write_lists(&self, lists: &[GameList]) -> Result<(), StorageError> {
        let bytes = encode_lists(lists)?;
        self.write_atomically(&self.path(), &bytes)
            .map_err(|err| self.write_error(err))
    }
}

/// In-process storage slot, handy for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: RwLock<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with a raw stored value, which need not be valid.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(raw.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// The raw value currently stored.
    pub fn raw(&self) -> Option<String> {
        self.slot.read().clone()
    }

    /// Make every subsequent write fail as if storage were full or disabled.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl ListStorage for MemoryStorage {
    fn read_lists(&self) -> Result<Vec<GameList>, StorageError> {
        match self.slot.read().as_deref() {
            Some(raw) => decode_lists(LISTS_NAMESPACE, raw),
            None => Ok(Vec::new()),
        }
    }

    fn write_lists(&self, lists: &[GameList]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                key: LISTS_NAMESPACE.to_string(),
            });
        }
        let bytes = encode_lists(lists)?;
        let raw = String::from_utf8(bytes).map_err(|err| StorageError::Write {
            key: LISTS_NAMESPACE.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })?;
        *self.slot.write() = Some(raw);
        Ok(())
    }
}
