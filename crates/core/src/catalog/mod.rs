//! Remote game catalog access.

/// Async HTTP client for the catalog service.
pub mod client;
/// Response records.
pub mod types;

pub use client::{CatalogClient, CatalogError, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
pub use types::{
    GameDetails, GamePlatform, GameSummary, NamedRef, Page, Platform, PlatformDetails, Screenshot,
    Trailer, TrailerSources,
};
