#![warn(clippy::all, missing_docs)]

//! Core domain logic for the video game organizer.
//!
//! This crate hosts the list models and their persistence, the remote
//! catalog client, search debouncing and configuration handling used by
//! the `vgo` binary and any future frontends.

pub mod catalog;
pub mod config;
pub mod models;
pub mod search;
pub mod store;

pub use catalog::{CatalogClient, CatalogError};
pub use config::AppConfig;
pub use models::{GameList, GameListItem};
pub use search::SearchDebouncer;
pub use store::{JsonFileStorage, ListError, ListStorage, ListStore, MemoryStorage, StorageError};
