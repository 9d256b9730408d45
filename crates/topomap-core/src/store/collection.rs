// ── Keyed reactive collection ──
//
// Concurrent storage for one topology entity kind, with a snapshot that
// subscribers are pushed on every mutation.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// An entity with a primary key.
pub trait Keyed {
    fn primary_key(&self) -> &str;
}

/// A `DashMap`-backed collection of one entity kind.
///
/// Every mutation rebuilds the snapshot subscribers receive. Snapshots
/// are sorted by key so views built from them are reproducible.
pub(crate) struct EntityCollection<T: Keyed + Clone + Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Keyed + Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or overwrite. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, entity: T) -> bool {
        let key = entity.primary_key().to_owned();
        let is_new = self.by_key.insert(key, Arc::new(entity)).is_none();
        self.changed();
        is_new
    }

    /// Replace an existing entity. Returns `false` (and changes nothing)
    /// when the key is absent.
    pub(crate) fn replace(&self, entity: T) -> bool {
        let Some(mut slot) = self.by_key.get_mut(entity.primary_key()) else {
            return false;
        };
        *slot = Arc::new(entity);
        drop(slot);
        self.changed();
        true
    }

    /// Apply `f` to a copy of the stored entity and store the result.
    /// Returns `false` when the key is absent.
    pub(crate) fn update(&self, key: &str, f: impl FnOnce(&mut T)) -> bool {
        let Some(mut slot) = self.by_key.get_mut(key) else {
            return false;
        };
        let mut entity = T::clone(&slot);
        f(&mut entity);
        *slot = Arc::new(entity);
        drop(slot);
        self.changed();
        true
    }

    /// Remove by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.changed();
        }
        removed
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn changed(&self) {
        let mut values: Vec<Arc<T>> = self.by_key.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| a.primary_key().cmp(b.primary_key()));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        key: String,
        value: u32,
    }

    impl Keyed for Item {
        fn primary_key(&self) -> &str {
            &self.key
        }
    }

    fn item(key: &str, value: u32) -> Item {
        Item {
            key: key.into(),
            value,
        }
    }

    #[test]
    fn upsert_reports_new_keys() {
        let col = EntityCollection::new();
        assert!(col.upsert(item("a", 1)));
        assert!(!col.upsert(item("a", 2)));
        assert_eq!(col.get("a").unwrap().value, 2);
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn replace_requires_existing_key() {
        let col = EntityCollection::new();
        assert!(!col.replace(item("a", 1)));
        assert!(col.get("a").is_none());
        col.upsert(item("a", 1));
        assert!(col.replace(item("a", 5)));
        assert_eq!(col.get("a").unwrap().value, 5);
    }

    #[test]
    fn update_applies_in_place() {
        let col = EntityCollection::new();
        col.upsert(item("a", 1));
        assert!(col.update("a", |i| i.value += 10));
        assert_eq!(col.get("a").unwrap().value, 11);
        assert!(!col.update("missing", |i| i.value = 0));
    }

    #[test]
    fn remove_only_notifies_when_present() {
        let col: EntityCollection<Item> = EntityCollection::new();
        col.upsert(item("a", 1));
        let rx = col.subscribe();
        assert!(col.remove("nope").is_none());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(col.remove("a").unwrap().value, 1);
        assert!(rx.has_changed().unwrap());
        assert!(col.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_sorted_by_key() {
        let col = EntityCollection::new();
        col.upsert(item("c", 3));
        col.upsert(item("a", 1));
        col.upsert(item("b", 2));
        let keys: Vec<_> = col.snapshot().iter().map(|i| i.key.clone()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn subscribers_see_mutations() {
        let col = EntityCollection::new();
        let mut rx = col.subscribe();
        col.upsert(item("a", 1));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}
