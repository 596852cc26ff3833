// ── Ordered entity collection ──
//
// Insertion-ordered storage with keyed lookup. The list order and the
// index live in one `IndexMap`, so they can never drift apart.

use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub(crate) struct Collection<T> {
    by_key: IndexMap<String, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            by_key: IndexMap::new(),
        }
    }
}

impl<T> Collection<T> {
    /// Insert or overwrite. Overwrites keep the original position.
    /// Returns `true` if the key was new.
    pub(crate) fn upsert(&mut self, key: String, entity: T) -> bool {
        self.by_key.insert(key, entity).is_none()
    }

    /// Insert only when the key is absent. Returns `true` if inserted.
    pub(crate) fn insert_new(&mut self, key: String, entity: T) -> bool {
        match self.by_key.entry(key) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(entity);
                true
            }
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&T> {
        self.by_key.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.by_key.get_mut(key)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.by_key.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_in_place() {
        let mut c = Collection::default();
        assert!(c.upsert("a".into(), 1));
        assert!(c.upsert("b".into(), 2));
        assert!(!c.upsert("a".into(), 3));
        assert_eq!(c.values().copied().collect::<Vec<_>>(), vec![3, 2]);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn insert_new_keeps_first() {
        let mut c = Collection::default();
        assert!(c.insert_new("x".into(), "first"));
        assert!(!c.insert_new("x".into(), "second"));
        assert_eq!(c.get("x"), Some(&"first"));
        assert_eq!(c.len(), 1);
    }
}
