//! Makes pending beacon blocks available by resolving their missing blobs from the local
//! execution engine and from peers.
pub mod availability_cache;
pub mod block_input;
pub mod block_sidecar_coupling;
pub mod caches;
pub mod config;
pub mod errors;
pub mod execution;
mod metrics;
pub mod network;
pub mod resolver;

pub use availability_cache::{
    AvailabilityCache, AvailabilityError, AvailabilityFuture, InsertOutcome,
};
pub use block_input::{
    AvailableBlock, BlobsSource, BlockBytes, BlockInput, BlockInputBlobs, BlockSource,
    PendingBlockInput, RpcBlock,
};
pub use block_sidecar_coupling::{verify_blob_for_block, BlobMismatch, BlocksAndBlobsRequestInfo};
pub use caches::{EngineBlobsCache, ResolverCaches, RetryTracker};
pub use config::{ResolverConfig, DEFAULT_ENGINE_BLOBS_CACHE_SIZE, DEFAULT_RETRY_TRACKER_SIZE};
pub use errors::Error;
pub use execution::{EngineError, ExecutionEngine};
pub use network::{NetworkError, NetworkRequester, PeerId};
pub use resolver::{plan_missing_blobs, BlobResolver, MissingBlobsPlan};
