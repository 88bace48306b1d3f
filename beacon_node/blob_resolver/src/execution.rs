use async_trait::async_trait;
use types::{BlobAndProof, ForkName, VersionedHash};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Offline,
    RequestFailed(String),
    /// The engine doesn't support the blobs endpoint.
    MethodUnsupported,
}

/// The local execution engine's blob pool.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Looks up blobs by versioned hash. The result is positionally aligned with
    /// `versioned_hashes`; `None` means the engine doesn't have that blob.
    async fn get_blobs(
        &self,
        fork: ForkName,
        versioned_hashes: Vec<VersionedHash>,
    ) -> Result<Vec<Option<BlobAndProof>>, EngineError>;
}
