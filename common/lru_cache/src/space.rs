//! A bounded set of keys which forgets the oldest inserted keys first.
use fnv::FnvHashSet;
use std::collections::VecDeque;

/// Set that stores keys until the capacity is used up. Reads never update the order of elements.
pub struct FifoSet<Key>
where
    Key: Eq + std::hash::Hash + Clone,
{
    /// The keys currently held.
    set: FnvHashSet<Key>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<Key>,
    /// The max number of keys retained after a prune.
    capacity: usize,
}

impl<Key> FifoSet<Key>
where
    Key: Eq + std::hash::Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        FifoSet {
            set: FnvHashSet::default(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Determines if the key is in the set.
    pub fn contains(&self, key: &Key) -> bool {
        self.set.contains(key)
    }

    // Inserts a new key without evicting anything.
    //
    // If the key was not present this returns `true`. If the key was already present this
    // returns `false` and its position in the eviction order is unchanged.
    pub fn insert(&mut self, key: Key) -> bool {
        let result = self.set.insert(key.clone());
        if result {
            self.order.push_back(key);
        }
        result
    }

    /// Evicts the oldest keys until at most `capacity` remain. Returns the number evicted.
    pub fn prune(&mut self) -> usize {
        let mut pruned = 0;
        for _ in 0..self.set.len().saturating_sub(self.capacity) {
            if let Some(key) = self.order.pop_front() {
                self.set.remove(&key);
                pruned += 1;
            }
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
