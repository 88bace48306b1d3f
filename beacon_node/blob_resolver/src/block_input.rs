use crate::availability_cache::{AvailabilityCache, AvailabilityError};
use std::sync::Arc;
use strum::IntoStaticStr;
use types::{BlobSidecarList, ChainSpec, ForkName, Hash256, SignedBeaconBlock, Slot};

/// The SSZ bytes of a block as they arrived from the network.
pub type BlockBytes = Arc<[u8]>;

/// How a block reached this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BlockSource {
    Gossip,
    Api,
    ByRange,
    ByRoot,
}

/// How the blob that completed a block's data arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BlobsSource {
    Gossip,
    Api,
    Engine,
    ByRange,
    ByRoot,
}

/// A block's blobs are considered to arrive with it when nothing else delivered them.
impl From<BlockSource> for BlobsSource {
    fn from(source: BlockSource) -> Self {
        match source {
            BlockSource::Gossip => BlobsSource::Gossip,
            BlockSource::Api => BlobsSource::Api,
            BlockSource::ByRange => BlobsSource::ByRange,
            BlockSource::ByRoot => BlobsSource::ByRoot,
        }
    }
}

/// Every blob of a block, ordered by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInputBlobs {
    pub fork: ForkName,
    pub blobs: BlobSidecarList,
    pub blobs_source: BlobsSource,
}

/// A block together with all of the blobs it commits to.
#[derive(Debug, Clone)]
pub struct AvailableBlock {
    block_root: Hash256,
    block: Arc<SignedBeaconBlock>,
    source: BlockSource,
    block_bytes: Option<BlockBytes>,
    blobs: Arc<BlockInputBlobs>,
}

impl AvailableBlock {
    /// Checks that `blobs` is exactly the set of blobs `block` commits to.
    pub fn new(
        spec: &ChainSpec,
        block: Arc<SignedBeaconBlock>,
        source: BlockSource,
        block_bytes: Option<BlockBytes>,
        blobs: Arc<BlockInputBlobs>,
    ) -> Result<Self, AvailabilityError> {
        let block_root = block.canonical_root();
        let expected_blobs = block.num_expected_blobs(spec);
        if blobs.blobs.len() != expected_blobs {
            return Err(AvailabilityError::ExpectedBlobsMismatch {
                current: expected_blobs,
                new: blobs.blobs.len(),
            });
        }
        for (position, blob) in blobs.blobs.iter().enumerate() {
            if blob.index != position as u64 {
                return Err(AvailabilityError::BlobIndexOutOfBounds {
                    index: blob.index,
                    expected_blobs,
                });
            }
            let received = blob.block_root();
            if received != block_root {
                return Err(AvailabilityError::BlockRootMismatch {
                    expected: block_root,
                    received,
                });
            }
        }

        Ok(Self {
            block_root,
            block,
            source,
            block_bytes,
            blobs,
        })
    }

    pub fn block_root(&self) -> Hash256 {
        self.block_root
    }

    pub fn block(&self) -> &Arc<SignedBeaconBlock> {
        &self.block
    }

    pub fn slot(&self) -> Slot {
        self.block.slot()
    }

    pub fn source(&self) -> BlockSource {
        self.source
    }

    pub fn block_bytes(&self) -> Option<&BlockBytes> {
        self.block_bytes.as_ref()
    }

    pub fn blobs(&self) -> &BlobSidecarList {
        &self.blobs.blobs
    }

    pub fn blobs_source(&self) -> BlobsSource {
        self.blobs.blobs_source
    }

    pub fn deconstruct(
        self,
    ) -> (
        Hash256,
        Arc<SignedBeaconBlock>,
        Option<BlockBytes>,
        Arc<BlockInputBlobs>,
    ) {
        (self.block_root, self.block, self.block_bytes, self.blobs)
    }
}

/// A block body paired with its raw bytes.
#[derive(Debug, Clone)]
pub struct RpcBlock {
    pub block: Arc<SignedBeaconBlock>,
    pub bytes: Option<BlockBytes>,
}

impl RpcBlock {
    pub fn new(block: Arc<SignedBeaconBlock>, bytes: Option<BlockBytes>) -> Self {
        Self { block, bytes }
    }

    pub fn canonical_root(&self) -> Hash256 {
        self.block.canonical_root()
    }
}

impl From<SignedBeaconBlock> for RpcBlock {
    fn from(block: SignedBeaconBlock) -> Self {
        Self::new(Arc::new(block), None)
    }
}

/// A block whose blobs are not all known yet. The block itself may also be unknown, when only
/// blobs referencing its root have been seen.
#[derive(Debug, Clone)]
pub struct PendingBlockInput {
    block_root: Hash256,
    block: Option<RpcBlock>,
    source: BlockSource,
    cached_data: Arc<AvailabilityCache>,
}

impl PendingBlockInput {
    pub fn new(
        spec: &ChainSpec,
        block: RpcBlock,
        source: BlockSource,
        cached_data: Arc<AvailabilityCache>,
    ) -> Result<Self, AvailabilityError> {
        let block_root = block.canonical_root();
        if block_root != cached_data.block_root() {
            return Err(AvailabilityError::BlockRootMismatch {
                expected: cached_data.block_root(),
                received: block_root,
            });
        }
        cached_data.set_expected_blobs(block.block.num_expected_blobs(spec), source.into())?;
        Ok(Self {
            block_root,
            block: Some(block),
            source,
            cached_data,
        })
    }

    /// A placeholder for a block that is known only by root.
    pub fn unknown_block(cached_data: Arc<AvailabilityCache>, source: BlockSource) -> Self {
        Self {
            block_root: cached_data.block_root(),
            block: None,
            source,
            cached_data,
        }
    }

    pub fn block_root(&self) -> Hash256 {
        self.block_root
    }

    pub fn block(&self) -> Option<&RpcBlock> {
        self.block.as_ref()
    }

    pub fn source(&self) -> BlockSource {
        self.source
    }

    pub fn cached_data(&self) -> &Arc<AvailabilityCache> {
        &self.cached_data
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Hash256, Option<RpcBlock>, BlockSource, Arc<AvailabilityCache>) {
        (self.block_root, self.block, self.source, self.cached_data)
    }
}

#[derive(Debug, Clone)]
pub enum BlockInput {
    Available(AvailableBlock),
    Pending(PendingBlockInput),
}

impl BlockInput {
    /// Wraps a freshly received block. Blocks without blobs are available straight away.
    pub fn new(
        spec: &ChainSpec,
        block: RpcBlock,
        source: BlockSource,
    ) -> Result<Self, AvailabilityError> {
        let fork = block.block.fork_name(spec);
        let cached_data = Arc::new(AvailabilityCache::new(block.canonical_root(), fork));
        Self::with_cached_data(spec, block, source, cached_data)
    }

    /// Wraps a block whose blobs may already be partially cached.
    pub fn with_cached_data(
        spec: &ChainSpec,
        block: RpcBlock,
        source: BlockSource,
        cached_data: Arc<AvailabilityCache>,
    ) -> Result<Self, AvailabilityError> {
        let pending = PendingBlockInput::new(spec, block, source, cached_data)?;
        pending.try_into_available(spec)
    }

    pub fn block_root(&self) -> Hash256 {
        match self {
            BlockInput::Available(block) => block.block_root(),
            BlockInput::Pending(pending) => pending.block_root(),
        }
    }

    pub fn source(&self) -> BlockSource {
        match self {
            BlockInput::Available(block) => block.source(),
            BlockInput::Pending(pending) => pending.source(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, BlockInput::Available(_))
    }

    pub fn into_available(self) -> Option<AvailableBlock> {
        match self {
            BlockInput::Available(block) => Some(block),
            BlockInput::Pending(_) => None,
        }
    }
}

impl PendingBlockInput {
    /// Promotes to an available block if the block is known and the cache has completed.
    pub fn try_into_available(self, spec: &ChainSpec) -> Result<BlockInput, AvailabilityError> {
        match (&self.block, self.cached_data.completed()) {
            (Some(block), Some(blobs)) => Ok(BlockInput::Available(AvailableBlock::new(
                spec,
                block.block.clone(),
                self.source,
                block.bytes.clone(),
                blobs,
            )?)),
            _ => Ok(BlockInput::Pending(self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{BeaconBlock, BeaconBlockBody, KzgCommitment, KzgCommitments, Signature};

    fn spec() -> ChainSpec {
        ForkName::Deneb.make_genesis_spec(ChainSpec::minimal())
    }

    fn block(num_blobs: u8) -> RpcBlock {
        SignedBeaconBlock::from_block(
            BeaconBlock {
                slot: Slot::new(3),
                body: BeaconBlockBody {
                    blob_kzg_commitments: KzgCommitments::new(vec![
                        KzgCommitment([9; 48]);
                        num_blobs as usize
                    ])
                    .unwrap(),
                    ..Default::default()
                },
                ..Default::default()
            },
            Signature::empty(),
        )
        .into()
    }

    #[test]
    fn block_without_blobs_is_available() {
        let input = BlockInput::new(&spec(), block(0), BlockSource::Gossip).unwrap();
        let available = input.into_available().unwrap();
        assert!(available.blobs().is_empty());
        assert_eq!(available.source(), BlockSource::Gossip);
    }

    #[test]
    fn block_with_blobs_is_pending() {
        let spec = spec();
        let input = BlockInput::new(&spec, block(2), BlockSource::Gossip).unwrap();
        let BlockInput::Pending(pending) = input else {
            panic!("expected a pending input");
        };
        assert_eq!(pending.cached_data().expected_blobs(), Some(2));
        assert_eq!(pending.cached_data().num_missing(), Some(2));
    }

    #[test]
    fn pre_deneb_block_ignores_body_commitments() {
        let spec = ForkName::Capella.make_genesis_spec(ChainSpec::minimal());
        let input = BlockInput::new(&spec, block(2), BlockSource::ByRange).unwrap();
        assert!(input.is_available());
    }

    #[test]
    fn cache_for_other_block_is_rejected() {
        let spec = spec();
        let cached_data = Arc::new(AvailabilityCache::new(Hash256::zero(), ForkName::Deneb));
        assert!(matches!(
            BlockInput::with_cached_data(&spec, block(1), BlockSource::Gossip, cached_data),
            Err(AvailabilityError::BlockRootMismatch { .. })
        ));
    }
}
