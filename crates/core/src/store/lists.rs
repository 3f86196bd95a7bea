use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::storage::{ListStorage, StorageError};
use crate::models::{GameList, GameListItem};

/// Recoverable outcomes reported by [`ListStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// No list with the given id exists.
    #[error("list {0} not found")]
    ListNotFound(String),
    /// The list already holds an item with this id.
    #[error("game {item_id} is already in list {list_id}")]
    DuplicateItem {
        /// Target list id.
        list_id: String,
        /// Rejected item id.
        item_id: u64,
    },
    /// A list title was blank after trimming.
    #[error("list title must not be empty")]
    EmptyTitle,
    /// The storage backend failed to read, decode or write the collection.
    #[error("list storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

/// Owner of the persisted list collection.
///
/// Every mutation reads the whole collection, applies the change and writes
/// the whole collection back.
pub struct ListStore<S> {
    storage: S,
}

impl<S: ListStorage> ListStore<S> {
    /// Build a store over the provided backend.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Borrow the underlying backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Return every list in stored order.
    ///
    /// Read or decode failures are logged and reported as an empty
    /// collection; use [`ListStore::try_all`] to tell the two apart.
    pub fn all(&self) -> Vec<GameList> {
        match self.storage.read_lists() {
            Ok(lists) => lists,
            Err(err) => {
                warn!("Failed to read lists, treating store as empty: {err}");
                Vec::new()
            }
        }
    }

    /// Return every list, surfacing storage failures.
    pub fn try_all(&self) -> Result<Vec<GameList>, ListError> {
        Ok(self.storage.read_lists()?)
    }

    /// Look up a list by id.
    pub fn get_by_id(&self, list_id: &str) -> Option<GameList> {
        self.all().into_iter().find(|list| list.id == list_id)
    }

    /// Whether the given list holds the given item. Absent lists hold nothing.
    pub fn contains_item(&self, list_id: &str, item_id: u64) -> bool {
        self.get_by_id(list_id)
            .map(|list| list.contains(item_id))
            .unwrap_or(false)
    }

    /// Create an empty list.
    pub fn create(&self, title: &str) -> Result<GameList, ListError> {
        self.create_with_items(title, Vec::new())
    }

    /// Create a list seeded with items. Repeated item ids keep their first occurrence.
    pub fn create_with_items(
        &self,
        title: &str,
        items: Vec<GameListItem>,
    ) -> Result<GameList, ListError> {
        let title = normalize_title(title)?;
        let mut lists = self.storage.read_lists()?;

        let id = fresh_id(&lists);
        let list = GameList::new(id, title, dedup_items(items), Utc::now());
        lists.push(list.clone());
        self.storage.write_lists(&lists)?;

        debug!(list_id = %list.id, title = %list.title, "Created list");
        Ok(list)
    }

    /// Rename an existing list.
    pub fn rename(&self, list_id: &str, title: &str) -> Result<GameList, ListError> {
        let title = normalize_title(title)?;
        self.update(list_id, |list| {
            list.title = title;
            Ok(())
        })
    }

    /// Delete a list. Deleting an unknown id is not an error.
    pub fn delete(&self, list_id: &str) -> Result<(), ListError> {
        let mut lists = self.storage.read_lists()?;
        let before = lists.len();
        lists.retain(|list| list.id != list_id);
        self.storage.write_lists(&lists)?;

        debug!(list_id, removed = before - lists.len(), "Deleted list");
        Ok(())
    }

    /// Replace the stored collection with an empty one.
    ///
    /// Unlike the other mutations this never reads the stored value, so it
    /// also clears a corrupt store.
    pub fn delete_all(&self) -> Result<(), ListError> {
        self.storage.write_lists(&[])?;
        debug!("Deleted all lists");
        Ok(())
    }

    /// Append an item unless one with the same id is already present.
    pub fn add_item(&self, list_id: &str, item: GameListItem) -> Result<GameList, ListError> {
        let item_id = item.id;
        let list = self.update(list_id, move |list| {
            if list.contains(item.id) {
                return Err(ListError::DuplicateItem {
                    list_id: list.id.clone(),
                    item_id: item.id,
                });
            }
            list.items.push(item);
            Ok(())
        })?;

        debug!(list_id, item_id, "Added item to list");
        Ok(list)
    }

    /// Remove an item. Removing an item the list does not hold is not an error.
    pub fn remove_item(&self, list_id: &str, item_id: u64) -> Result<GameList, ListError> {
        let list = self.update(list_id, |list| {
            list.items.retain(|item| item.id != item_id);
            Ok(())
        })?;

        debug!(list_id, item_id, "Removed item from list");
        Ok(list)
    }

    fn update<F>(&self, list_id: &str, apply: F) -> Result<GameList, ListError>
    where
        F: FnOnce(&mut GameList) -> Result<(), ListError>,
    {
        let mut lists = self.storage.read_lists()?;
        let list = lists
            .iter_mut()
            .find(|list| list.id == list_id)
            .ok_or_else(|| ListError::ListNotFound(list_id.to_string()))?;

        apply(list)?;
        list.touch(Utc::now());
        let updated = list.clone();

        self.storage.write_lists(&lists)?;
        Ok(updated)
    }
}

fn normalize_title(title: &str) -> Result<String, ListError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ListError::EmptyTitle);
    }
    Ok(title.to_string())
}

fn fresh_id(lists: &[GameList]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if lists.iter().all(|list| list.id != id) {
            return id;
        }
    }
}

fn dedup_items(items: Vec<GameListItem>) -> Vec<GameListItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use anyhow::Result;

    fn store() -> ListStore<MemoryStorage> {
        ListStore::new(MemoryStorage::new())
    }

    fn chrono_trigger() -> GameListItem {
        GameListItem {
            id: 101,
            name: "Chrono Trigger".to_string(),
            image: None,
            rating: Some(4.6),
            released: Some("1995-03-11".to_string()),
        }
    }

    #[test]
    fn create_then_lookup() -> Result<()> {
        let store = store();
        let created = store.create("Favorites")?;

        let found = store.get_by_id(&created.id).expect("list should exist");
        assert_eq!(found.title, "Favorites");
        assert!(found.items.is_empty());
        assert_eq!(found.created_at, found.updated_at);
        assert_eq!(found, created);
        Ok(())
    }

    #[test]
    fn create_trims_and_rejects_blank_titles() -> Result<()> {
        let store = store();
        assert_eq!(store.create("  RPGs ")?.title, "RPGs");
        assert!(matches!(store.create("   "), Err(ListError::EmptyTitle)));
        assert_eq!(store.all().len(), 1);
        Ok(())
    }

    #[test]
    fn create_with_items_collapses_duplicates() -> Result<()> {
        let store = store();
        let list = store.create_with_items(
            "Seeded",
            vec![
                chrono_trigger(),
                GameListItem::new(7, "Secret of Mana"),
                GameListItem::new(101, "Chrono Trigger (dup)"),
            ],
        )?;
        let ids: Vec<_> = list.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![101, 7]);
        assert_eq!(list.items[0].name, "Chrono Trigger");
        Ok(())
    }

    #[test]
    fn ids_stay_unique_across_creates_and_deletes() -> Result<()> {
        let store = store();
        let mut created = Vec::new();
        for round in 0..20 {
            let list = store.create(&format!("List {round}"))?;
            if round % 3 == 0 {
                store.delete(&list.id)?;
            } else {
                created.push(list.id);
            }
        }

        let lists = store.all();
        let unique: HashSet<_> = lists.iter().map(|list| list.id.as_str()).collect();
        assert_eq!(unique.len(), lists.len());
        let stored: Vec<_> = lists.into_iter().map(|list| list.id).collect();
        assert_eq!(stored, created);
        Ok(())
    }

    #[test]
    fn rpg_scenario() -> Result<()> {
        let store = store();
        let list = store.create("RPGs")?;

        let updated = store.add_item(&list.id, chrono_trigger())?;
        assert_eq!(updated.items.len(), 1);

        let err = store.add_item(&list.id, chrono_trigger()).unwrap_err();
        assert!(matches!(err, ListError::DuplicateItem { item_id: 101, .. }));
        assert_eq!(store.get_by_id(&list.id).map(|l| l.items.len()), Some(1));

        let updated = store.remove_item(&list.id, 101)?;
        assert!(updated.items.is_empty());

        store.delete_all()?;
        assert!(store.all().is_empty());
        Ok(())
    }

    #[test]
    fn duplicate_add_leaves_updated_at_untouched() -> Result<()> {
        let store = store();
        let list = store.create("RPGs")?;
        let first = store.add_item(&list.id, chrono_trigger())?;
        assert!(first.updated_at >= list.updated_at);

        assert!(store.add_item(&list.id, chrono_trigger()).is_err());
        let stored = store.get_by_id(&list.id).expect("list should exist");
        assert_eq!(stored.updated_at, first.updated_at);
        assert_eq!(stored.items, vec![chrono_trigger()]);
        Ok(())
    }

    #[test]
    fn removing_twice_is_not_an_error() -> Result<()> {
        let store = store();
        let list = store.create("RPGs")?;
        store.add_item(&list.id, chrono_trigger())?;

        let first = store.remove_item(&list.id, 101)?;
        let second = store.remove_item(&list.id, 101)?;
        assert!(first.items.is_empty());
        assert!(second.items.is_empty());
        assert!(second.updated_at >= first.updated_at);
        assert!(second.updated_at >= second.created_at);
        Ok(())
    }

    #[test]
    fn missing_list_is_reported_and_store_unchanged() -> Result<()> {
        let store = store();
        store.create("RPGs")?;
        let before = store.storage().raw();

        let err = store.add_item("nonexistent", chrono_trigger()).unwrap_err();
        assert!(matches!(err, ListError::ListNotFound(ref id) if id == "nonexistent"));
        assert!(matches!(
            store.remove_item("nonexistent", 101),
            Err(ListError::ListNotFound(_))
        ));
        assert!(matches!(
            store.rename("nonexistent", "Other"),
            Err(ListError::ListNotFound(_))
        ));
        assert_eq!(store.storage().raw(), before);
        Ok(())
    }

    #[test]
    fn rename_refreshes_updated_at() -> Result<()> {
        let store = store();
        let list = store.create("RPGs")?;
        let renamed = store.rename(&list.id, " JRPGs ")?;
        assert_eq!(renamed.title, "JRPGs");
        assert_eq!(renamed.created_at, list.created_at);
        assert!(renamed.updated_at >= list.updated_at);
        assert!(matches!(
            store.rename(&list.id, ""),
            Err(ListError::EmptyTitle)
        ));
        Ok(())
    }

    #[test]
    fn delete_unknown_list_is_a_no_op() -> Result<()> {
        let store = store();
        let list = store.create("RPGs")?;
        store.delete("nonexistent")?;
        assert_eq!(store.all(), vec![list]);
        Ok(())
    }

    #[test]
    fn contains_item_tracks_membership() -> Result<()> {
        let store = store();
        let list = store.create("RPGs")?;
        assert!(!store.contains_item(&list.id, 101));
        store.add_item(&list.id, chrono_trigger())?;
        assert!(store.contains_item(&list.id, 101));
        assert!(!store.contains_item("nonexistent", 101));
        Ok(())
    }

    #[test]
    fn corrupt_store_reads_empty_but_is_not_overwritten() -> Result<()> {
        let store = ListStore::new(MemoryStorage::with_raw("{ definitely not lists"));

        assert!(store.all().is_empty());
        assert!(store.get_by_id("anything").is_none());
        assert!(matches!(
            store.try_all(),
            Err(ListError::StorageUnavailable(StorageError::Corrupt { .. }))
        ));
        assert!(matches!(
            store.create("RPGs"),
            Err(ListError::StorageUnavailable(_))
        ));
        assert_eq!(
            store.storage().raw().as_deref(),
            Some("{ definitely not lists")
        );

        store.delete_all()?;
        assert!(store.try_all()?.is_empty());
        Ok(())
    }

    #[test]
    fn failed_writes_leave_collection_unchanged() -> Result<()> {
        let store = store();
        let list = store.create("RPGs")?;
        store.storage().set_fail_writes(true);

        assert!(matches!(
            store.add_item(&list.id, chrono_trigger()),
            Err(ListError::StorageUnavailable(_))
        ));
        assert!(matches!(
            store.create("Shooters"),
            Err(ListError::StorageUnavailable(_))
        ));
        assert!(store.delete(&list.id).is_err());
        assert!(store.delete_all().is_err());

        store.storage().set_fail_writes(false);
        assert_eq!(store.all(), vec![list]);
        Ok(())
    }
}
