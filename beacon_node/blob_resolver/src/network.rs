use crate::block_input::RpcBlock;
use async_trait::async_trait;
use std::fmt;
use types::{BlobIdentifier, BlobSidecarList, Hash256};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(String);

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        PeerId(id.to_string())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        PeerId(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The peer does not have the requested resource.
    ResourceUnavailable(Hash256),
    Disconnected,
    Timeout,
    RpcError(String),
}

/// Req/resp requests issued to a single peer.
#[async_trait]
pub trait NetworkRequester: Send + Sync {
    /// Blocks for each of `block_roots`. Roots the peer doesn't know are omitted.
    async fn blocks_by_root(
        &self,
        peer_id: &PeerId,
        block_roots: Vec<Hash256>,
    ) -> Result<Vec<RpcBlock>, NetworkError>;

    /// The subset of `blob_ids` the peer holds, in any order.
    async fn blobs_by_root(
        &self,
        peer_id: &PeerId,
        blob_ids: Vec<BlobIdentifier>,
    ) -> Result<BlobSidecarList, NetworkError>;
}
