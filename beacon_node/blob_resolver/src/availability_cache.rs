//! The per-block ledger of which blobs have been resolved.
//!
//! A cache is shared between every code path that can observe the same pending block (gossip,
//! by-root lookups, engine fetches). Insertion is idempotent and the completion signal fires
//! exactly once, when the last missing index is filled.
use crate::block_input::{BlobsSource, BlockInputBlobs};
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use types::{BlobSidecar, ForkName, Hash256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    /// The number of expected blobs was already set to a different value.
    ExpectedBlobsMismatch { current: usize, new: usize },
    BlobIndexOutOfBounds { index: u64, expected_blobs: usize },
    BlockRootMismatch { expected: Hash256, received: Hash256 },
}

/// Resolves with the complete set of blobs once the cache is complete, or with `Canceled` if the
/// cache is dropped first. Clones observe the same result.
pub type AvailabilityFuture = Shared<oneshot::Receiver<Arc<BlockInputBlobs>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The index was already present; the cache is unchanged.
    Duplicate,
    /// The cache had already completed; late arrivals are ignored.
    AlreadyComplete,
}

struct Inner {
    expected_blobs: Option<usize>,
    blobs: BTreeMap<u64, Arc<BlobSidecar>>,
    last_source: Option<BlobsSource>,
    sender: Option<oneshot::Sender<Arc<BlockInputBlobs>>>,
    completed: Option<Arc<BlockInputBlobs>>,
}

pub struct AvailabilityCache {
    block_root: Hash256,
    fork: ForkName,
    inner: Mutex<Inner>,
    availability: AvailabilityFuture,
}

impl AvailabilityCache {
    /// A cache for a block whose body has not been seen yet, so the number of blobs is unknown.
    pub fn new(block_root: Hash256, fork: ForkName) -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            block_root,
            fork,
            inner: Mutex::new(Inner {
                expected_blobs: None,
                blobs: BTreeMap::new(),
                last_source: None,
                sender: Some(sender),
                completed: None,
            }),
            availability: receiver.shared(),
        }
    }

    pub fn with_expected_blobs(
        block_root: Hash256,
        fork: ForkName,
        expected_blobs: usize,
        source: BlobsSource,
    ) -> Result<Self, AvailabilityError> {
        let cache = Self::new(block_root, fork);
        cache.set_expected_blobs(expected_blobs, source)?;
        Ok(cache)
    }

    pub fn block_root(&self) -> Hash256 {
        self.block_root
    }

    pub fn fork(&self) -> ForkName {
        self.fork
    }

    pub fn expected_blobs(&self) -> Option<usize> {
        self.inner.lock().expected_blobs
    }

    /// Records how many blobs the block commits to. Setting the same value again is a no-op.
    ///
    /// Completes the cache if every blob is already present, which is immediate for a block
    /// without blobs. If no blob was ever inserted the completed blobs are attributed to
    /// `source`, the path that delivered the block.
    pub fn set_expected_blobs(
        &self,
        expected_blobs: usize,
        source: BlobsSource,
    ) -> Result<(), AvailabilityError> {
        let mut inner = self.inner.lock();
        match inner.expected_blobs {
            Some(current) if current != expected_blobs => {
                return Err(AvailabilityError::ExpectedBlobsMismatch {
                    current,
                    new: expected_blobs,
                })
            }
            Some(_) => return Ok(()),
            None => {}
        }

        if let Some((&index, _)) = inner.blobs.range(expected_blobs as u64..).next() {
            return Err(AvailabilityError::BlobIndexOutOfBounds {
                index,
                expected_blobs,
            });
        }

        inner.expected_blobs = Some(expected_blobs);
        self.maybe_complete(&mut inner, source);
        Ok(())
    }

    /// Adds `blob` to the cache.
    ///
    /// Inserting an index that is already present, or inserting after completion, leaves the
    /// cache untouched.
    pub fn insert(
        &self,
        blob: Arc<BlobSidecar>,
        source: BlobsSource,
    ) -> Result<InsertOutcome, AvailabilityError> {
        let mut inner = self.inner.lock();
        if inner.completed.is_some() {
            return Ok(InsertOutcome::AlreadyComplete);
        }
        if inner.blobs.contains_key(&blob.index) {
            return Ok(InsertOutcome::Duplicate);
        }

        let received = blob.block_root();
        if received != self.block_root {
            return Err(AvailabilityError::BlockRootMismatch {
                expected: self.block_root,
                received,
            });
        }
        if let Some(expected_blobs) = inner.expected_blobs {
            if blob.index >= expected_blobs as u64 {
                return Err(AvailabilityError::BlobIndexOutOfBounds {
                    index: blob.index,
                    expected_blobs,
                });
            }
        }

        inner.blobs.insert(blob.index, blob);
        inner.last_source = Some(source);
        self.maybe_complete(&mut inner, source);
        Ok(InsertOutcome::Inserted)
    }

    /// The completed blobs are attributed to the source of the last blob inserted, or to
    /// `fallback` when there is none.
    fn maybe_complete(&self, inner: &mut Inner, fallback: BlobsSource) {
        let Some(expected_blobs) = inner.expected_blobs else {
            return;
        };
        if inner.completed.is_some() || inner.blobs.len() != expected_blobs {
            return;
        }

        let blobs = Arc::new(BlockInputBlobs {
            fork: self.fork,
            blobs: inner.blobs.values().cloned().collect(),
            blobs_source: inner.last_source.unwrap_or(fallback),
        });
        inner.completed = Some(blobs.clone());
        if let Some(sender) = inner.sender.take() {
            // Nobody may be listening, which is fine.
            let _ = sender.send(blobs);
        }
    }

    pub fn contains(&self, index: u64) -> bool {
        self.inner.lock().blobs.contains_key(&index)
    }

    pub fn get(&self, index: u64) -> Option<Arc<BlobSidecar>> {
        self.inner.lock().blobs.get(&index).cloned()
    }

    /// Indices present in the cache, ascending.
    pub fn indices(&self) -> Vec<u64> {
        self.inner.lock().blobs.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().blobs.is_empty()
    }

    /// The number of blobs still missing, if the expected number is known.
    pub fn num_missing(&self) -> Option<usize> {
        let inner = self.inner.lock();
        inner
            .expected_blobs
            .map(|expected| expected.saturating_sub(inner.blobs.len()))
    }

    pub fn is_complete(&self) -> bool {
        self.inner.lock().completed.is_some()
    }

    /// The completed blobs, if the cache has completed.
    pub fn completed(&self) -> Option<Arc<BlockInputBlobs>> {
        self.inner.lock().completed.clone()
    }

    /// A future resolving once the cache completes. Every subscriber receives the same value.
    pub fn subscribe(&self) -> AvailabilityFuture {
        self.availability.clone()
    }
}

impl std::fmt::Debug for AvailabilityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AvailabilityCache")
            .field("block_root", &self.block_root)
            .field("fork", &self.fork)
            .field("expected_blobs", &inner.expected_blobs)
            .field("indices", &inner.blobs.keys().collect::<Vec<_>>())
            .field("completed", &inner.completed.is_some())
            .finish()
    }
}
