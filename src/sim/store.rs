//! Entity collections
//!
//! Plain vectors kept in id order. Ids are handed out monotonically and
//! entities are only ever appended, so insertion order is id order and
//! iteration is deterministic without sorting.

use serde::{Deserialize, Serialize};

/// Opaque, session-unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Anything kept in an [`EntityStore`]
pub trait Entity {
    fn id(&self) -> EntityId;
    /// False once the entity should be culled
    fn is_alive(&self) -> bool;
}

/// Id-ordered collection of one entity type
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    items: Vec<T>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity. Ids must be increasing.
    pub fn add(&mut self, entity: T) {
        debug_assert!(
            self.items.last().is_none_or(|last| last.id() < entity.id()),
            "entity ids must be added in increasing order"
        );
        self.items.push(entity);
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items
            .binary_search_by_key(&id, |e| e.id())
            .ok()
            .map(|i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        match self.items.binary_search_by_key(&id, |e| e.id()) {
            Ok(i) => Some(&mut self.items[i]),
            Err(_) => None,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of entities that are still alive
    pub fn alive_count(&self) -> usize {
        self.items.iter().filter(|e| e.is_alive()).count()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove every entity matching the predicate, returning how many went
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|e| !pred(e));
        before - self.items.len()
    }

    /// Remove every entity that reports itself dead
    pub fn cull_dead(&mut self) -> usize {
        self.remove_where(|e| !e.is_alive())
    }
}

impl<'a, T> IntoIterator for &'a EntityStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Monotonic id source shared by all stores of a world
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dummy {
        id: EntityId,
        hp: i32,
    }

    impl Entity for Dummy {
        fn id(&self) -> EntityId {
            self.id
        }
        fn is_alive(&self) -> bool {
            self.hp > 0
        }
    }

    fn store_with(hps: &[i32]) -> (EntityStore<Dummy>, IdAllocator) {
        let mut ids = IdAllocator::default();
        let mut store = EntityStore::new();
        for &hp in hps {
            store.add(Dummy { id: ids.next(), hp });
        }
        (store, ids)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdAllocator::default();
        let a = ids.next();
        let b = ids.next();
        assert!(a < b);
        assert_eq!(a, EntityId(1));
    }

    #[test]
    fn test_cull_dead_keeps_order() {
        let (mut store, _) = store_with(&[1, 0, 3, -2, 5]);
        assert_eq!(store.alive_count(), 3);
        assert_eq!(store.cull_dead(), 2);
        let hps: Vec<i32> = store.iter().map(|d| d.hp).collect();
        assert_eq!(hps, vec![1, 3, 5]);
        let ids: Vec<u32> = store.iter().map(|d| d.id.0).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_lookup_by_id() {
        let (mut store, _) = store_with(&[1, 2, 3]);
        assert_eq!(store.get(EntityId(2)).map(|d| d.hp), Some(2));
        assert!(store.get(EntityId(9)).is_none());

        if let Some(d) = store.get_mut(EntityId(3)) {
            d.hp = 0;
        }
        store.remove_where(|d| d.hp == 0);
        assert!(store.get(EntityId(3)).is_none());
        assert_eq!(store.len(), 2);
    }
}
