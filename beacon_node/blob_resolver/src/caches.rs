//! Bounded caches shared by every resolution attempt.
use crate::config::ResolverConfig;
use lru_cache::{FifoMap, FifoSet};
use parking_lot::Mutex;
use types::{BlobAndProof, Hash256, VersionedHash};

/// Execution engine answers by versioned hash. A `None` entry means the engine was asked and did
/// not have the blob, which is remembered so that it is not asked again.
pub struct EngineBlobsCache {
    blobs: Mutex<FifoMap<VersionedHash, Option<BlobAndProof>>>,
}

impl EngineBlobsCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            blobs: Mutex::new(FifoMap::new(capacity)),
        }
    }

    /// `None` if the engine was never asked, `Some(None)` if it answered without the blob.
    pub fn get(&self, versioned_hash: &VersionedHash) -> Option<Option<BlobAndProof>> {
        self.blobs.lock().get(versioned_hash).cloned()
    }

    /// Overwrites keep the entry's original position in the eviction order.
    pub fn insert(&self, versioned_hash: VersionedHash, blob_and_proof: Option<BlobAndProof>) {
        self.blobs.lock().insert(versioned_hash, blob_and_proof);
    }

    /// Evicts the oldest entries until the cache is within capacity, returning how many.
    pub fn prune(&self) -> usize {
        self.blobs.lock().prune()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

/// Block roots whose resolution has been attempted at least once.
pub struct RetryTracker {
    roots: Mutex<FifoSet<Hash256>>,
}

impl RetryTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            roots: Mutex::new(FifoSet::new(capacity)),
        }
    }

    /// Records an attempt for `block_root`, returning `true` if it had been attempted before.
    pub fn record_attempt(&self, block_root: Hash256) -> bool {
        !self.roots.lock().insert(block_root)
    }

    pub fn contains(&self, block_root: &Hash256) -> bool {
        self.roots.lock().contains(block_root)
    }

    pub fn prune(&self) -> usize {
        self.roots.lock().prune()
    }

    pub fn len(&self) -> usize {
        self.roots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.lock().is_empty()
    }
}

pub struct ResolverCaches {
    pub engine_blobs: EngineBlobsCache,
    pub retry_tracker: RetryTracker,
}

impl ResolverCaches {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            engine_blobs: EngineBlobsCache::new(config.engine_blobs_cache_size),
            retry_tracker: RetryTracker::new(config.retry_tracker_size),
        }
    }
}

impl Default for ResolverCaches {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Blob, KzgProof};

    fn hash(i: u64) -> VersionedHash {
        Hash256::from_low_u64_be(i)
    }

    #[test]
    fn engine_cache_distinguishes_unknown_from_absent() {
        let cache = EngineBlobsCache::new(4);
        cache.insert(hash(1), None);
        cache.insert(
            hash(2),
            Some(BlobAndProof {
                blob: Blob::new(vec![1]),
                proof: KzgProof::empty(),
            }),
        );

        assert_eq!(cache.get(&hash(0)), None);
        assert_eq!(cache.get(&hash(1)), Some(None));
        assert!(matches!(cache.get(&hash(2)), Some(Some(_))));
    }

    #[test]
    fn engine_cache_prunes_oldest_first() {
        let cache = EngineBlobsCache::new(2);
        for i in 0..3 {
            cache.insert(hash(i), None);
        }
        // Refreshing an existing entry does not move it to the back.
        cache.insert(hash(0), None);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.prune(), 1);
        assert_eq!(cache.get(&hash(0)), None);
        assert_eq!(cache.get(&hash(1)), Some(None));
    }

    #[test]
    fn retry_tracker_reports_previous_attempts() {
        let tracker = RetryTracker::new(1);
        assert!(!tracker.record_attempt(hash(1)));
        assert!(tracker.record_attempt(hash(1)));
        assert!(!tracker.record_attempt(hash(2)));

        assert_eq!(tracker.prune(), 1);
        assert!(!tracker.contains(&hash(1)));
        assert!(tracker.contains(&hash(2)));
    }
}
