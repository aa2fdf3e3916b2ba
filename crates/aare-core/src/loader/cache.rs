use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Bounded map evicting the least-recently-used key once `capacity` is exceeded.
///
/// Both `get` and `insert` count as a use.
#[derive(Debug)]
pub(crate) struct LruCache<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    recency: VecDeque<K>,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    pub(crate) fn get(&mut self, key: &K) -> Option<V> {
        let value = self.entries.get(key)?.clone();
        self.touch(key);
        Some(value)
    }

    /// Inserts or replaces `key`, returning the evicted key if any.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<K> {
        if self.entries.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return None;
        }
        self.recency.push_back(key);
        if self.entries.len() <= self.capacity {
            return None;
        }
        let evicted = self.recency.pop_front()?;
        self.entries.remove(&evicted);
        Some(evicted)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.recency.iter().position(|candidate| candidate == key) {
            if let Some(found) = self.recency.remove(pos) {
                self.recency.push_back(found);
            }
        }
    }
}
