use fnv::FnvHashMap;
use std::collections::VecDeque;
use std::hash::Hash;

/// A key-value map which forgets the oldest inserted keys first.
///
/// Overwriting the value of a present key does not move it in the eviction order.
pub struct FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    map: FnvHashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K, V> FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            map: FnvHashMap::default(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Inserts or overwrites `key`, returning the previous value if there was one.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.map.insert(key.clone(), value);
        if previous.is_none() {
            self.order.push_back(key);
        }
        previous
    }

    /// Evicts the oldest entries until at most `capacity` remain. Returns the number evicted.
    pub fn prune(&mut self) -> usize {
        let mut pruned = 0;
        while self.map.len() > self.capacity {
            match self.order.pop_front() {
                Some(key) => {
                    self.map.remove(&key);
                    pruned += 1;
                }
                None => break,
            }
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from oldest to youngest.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }
}
