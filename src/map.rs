use core::{borrow::Borrow, cmp::Ordering, fmt};

use crate::{AvlTree, Result};

/// An ordered map based on an [AVL tree].
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlMap<K, V> {
    tree: AvlTree<MapEntry<K, V>>,
}

// A key-value pair that compares by key alone, so the tree treats a new value for an existing key
// as an update of that key's entry.
struct MapEntry<K, V> {
    key: K,
    value: V,
}

impl<K: Ord, V> PartialEq for MapEntry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord, V> Eq for MapEntry<K, V> {}

impl<K: Ord, V> PartialOrd for MapEntry<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, V> Ord for MapEntry<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<K, V> Borrow<K> for MapEntry<K, V> {
    fn borrow(&self) -> &K {
        &self.key
    }
}

impl<K, V> AvlMap<K, V> {
    /// Creates a new, empty `AvlMap`.
    pub const fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }

    /// Returns `true` if the map contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the map.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|entry| (&entry.key, &entry.value))
    }

    /// Removes and returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree
            .pop_first()
            .map(|MapEntry { key, value }| (key, value))
    }

    /// Returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|entry| (&entry.key, &entry.value))
    }

    /// Removes and returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree
            .pop_last()
            .map(|MapEntry { key, value }| (key, value))
    }

    /// Returns an iterator over the key-value pairs of the map, in ascending key order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> + '_ {
        self.tree.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Clears the map, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contains `key`, its value is replaced and the old value is returned.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree
            .insert(MapEntry { key, value })
            .map(|replaced| replaced.value)
    }

    /// Returns `true` if the map contains a value associated with `key`.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Returns a reference to the value associated with `key`.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key).map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value associated with `key`.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.get_mut(key).map(|entry| &mut entry.value)
    }

    /// Returns the value associated with `key`, or [`Error::KeyNotFound`] if there is none.
    ///
    /// [`Error::KeyNotFound`]: crate::Error::KeyNotFound
    #[inline]
    pub fn retrieve(&self, key: &K) -> Result<&V> {
        self.tree.retrieve(key).map(|entry| &entry.value)
    }

    /// Removes the value associated with `key` from the map.
    #[inline]
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree.remove(key).map(|entry| entry.value)
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        AvlMap::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AvlMap::new();

        for (key, value) in iter {
            map.insert(key, value);
        }

        map
    }
}
