//! List persistence and mutation.

/// The list store and its outcome type.
pub mod lists;
/// Storage backends holding the serialised list collection.
pub mod storage;

pub use lists::{ListError, ListStore};
pub use storage::{JsonFileStorage, ListStorage, MemoryStorage, StorageError, LISTS_NAMESPACE};
