//! Shared domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a catalog game taken at the moment it was added to a list.
///
/// Items are never refreshed from the catalog afterwards; a later rating
/// change or rename upstream does not reach lists that already hold them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameListItem {
    /// Catalog-assigned game identifier.
    pub id: u64,
    /// Display name at the time of the snapshot.
    pub name: String,
    /// Cover image URL, if the catalog had one.
    #[serde(default)]
    pub image: Option<String>,
    /// Average user rating.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Release date as reported by the catalog (`YYYY-MM-DD`).
    #[serde(default)]
    pub released: Option<String>,
}

impl GameListItem {
    /// Build a bare item carrying only an id and a name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image: None,
            rating: None,
            released: None,
        }
    }

    /// Release year extracted from the `released` date, when parseable.
    pub fn release_year(&self) -> Option<i32> {
        self.released
            .as_deref()
            .and_then(|value| value.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

/// A user-curated, named, ordered collection of games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameList {
    /// Unique identifier assigned at creation.
    pub id: String,
    /// User-supplied title.
    pub title: String,
    /// Items in insertion order.
    #[serde(default)]
    pub items: Vec<GameListItem>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl GameList {
    pub(crate) fn new(
        id: String,
        title: String,
        items: Vec<GameListItem>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of items held by the list.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item with the given catalog id is present.
    pub fn contains(&self, item_id: u64) -> bool {
        self.items.iter().any(|item| item.id == item_id)
    }

    /// Returns a label such as `"RPGs (3 items)"`.
    pub fn summary(&self) -> String {
        let noun = if self.items.len() == 1 { "item" } else { "items" };
        format!("{} ({} {})", self.title, self.items.len(), noun)
    }

    /// Refresh `updated_at`, never moving it backwards.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at);
    }
}
