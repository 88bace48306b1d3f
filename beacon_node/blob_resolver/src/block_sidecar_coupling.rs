use crate::availability_cache::AvailabilityCache;
use crate::block_input::{BlobsSource, BlockInput, BlockSource, RpcBlock};
use crate::errors::Error;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use types::{BlobSidecar, ChainSpec, Hash256, KzgCommitment, Slot};

/// Why a blob was rejected as not belonging to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobMismatch {
    WrongBlock,
    IndexOutOfBounds,
    CommitmentMismatch,
    InvalidInclusionProof,
}

/// Checks that `sidecar` is the blob `block_root` commits to at `sidecar.index`.
pub fn verify_blob_for_block(
    sidecar: &BlobSidecar,
    block_root: Hash256,
    commitments: &[KzgCommitment],
) -> Result<(), BlobMismatch> {
    if sidecar.block_root() != block_root {
        return Err(BlobMismatch::WrongBlock);
    }
    let commitment = commitments
        .get(sidecar.index as usize)
        .ok_or(BlobMismatch::IndexOutOfBounds)?;
    if *commitment != sidecar.kzg_commitment {
        return Err(BlobMismatch::CommitmentMismatch);
    }
    if !sidecar.verify_blob_sidecar_inclusion_proof() {
        return Err(BlobMismatch::InvalidInclusionProof);
    }
    Ok(())
}

#[derive(Debug)]
pub struct BlocksAndBlobsRequestInfo {
    /// Blocks we have received awaiting for their corresponding sidecars.
    accumulated_blocks: VecDeque<RpcBlock>,
    /// Sidecars we have received awaiting for their corresponding block.
    accumulated_sidecars: VecDeque<Arc<BlobSidecar>>,
    /// Whether the individual RPC request for blocks is finished or not.
    is_blocks_stream_terminated: bool,
    /// Whether the individual RPC request for sidecars is finished or not.
    is_sidecars_stream_terminated: bool,
    block_source: BlockSource,
    blobs_source: BlobsSource,
}

impl BlocksAndBlobsRequestInfo {
    pub fn new(block_source: BlockSource, blobs_source: BlobsSource) -> Self {
        Self {
            accumulated_blocks: VecDeque::new(),
            accumulated_sidecars: VecDeque::new(),
            is_blocks_stream_terminated: false,
            is_sidecars_stream_terminated: false,
            block_source,
            blobs_source,
        }
    }

    pub fn add_block_response(&mut self, maybe_block: Option<RpcBlock>) {
        match maybe_block {
            Some(block) => self.accumulated_blocks.push_back(block),
            None => self.is_blocks_stream_terminated = true,
        }
    }

    pub fn add_sidecar_response(&mut self, maybe_sidecar: Option<Arc<BlobSidecar>>) {
        match maybe_sidecar {
            Some(sidecar) => self.accumulated_sidecars.push_back(sidecar),
            None => self.is_sidecars_stream_terminated = true,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.is_blocks_stream_terminated && self.is_sidecars_stream_terminated
    }

    /// Pairs every block with its blobs by block root and index, preserving block order.
    ///
    /// Blocks at or before `max_blob_slot` must come with all of their blobs. Later blocks may be
    /// incomplete and are returned pending, with whatever blobs were received already cached.
    /// Any blob that doesn't belong to one of the blocks fails the whole batch.
    pub fn into_responses(
        self,
        spec: &ChainSpec,
        max_blob_slot: Slot,
    ) -> Result<Vec<BlockInput>, Error> {
        let BlocksAndBlobsRequestInfo {
            accumulated_blocks,
            accumulated_sidecars,
            block_source,
            blobs_source,
            ..
        } = self;

        let mut seen = HashSet::with_capacity(accumulated_sidecars.len());
        let mut sidecars_by_root: HashMap<Hash256, Vec<Arc<BlobSidecar>>> = HashMap::new();
        for sidecar in accumulated_sidecars {
            let id = sidecar.id();
            if !seen.insert(id) {
                return Err(Error::DuplicateBlob(id));
            }
            sidecars_by_root
                .entry(id.block_root)
                .or_default()
                .push(sidecar);
        }

        let mut responses = Vec::with_capacity(accumulated_blocks.len());
        for block in accumulated_blocks {
            let block_root = block.canonical_root();
            let commitments = block.block.blob_kzg_commitments(spec);
            let sidecars = sidecars_by_root.remove(&block_root).unwrap_or_default();

            for sidecar in &sidecars {
                if verify_blob_for_block(sidecar, block_root, commitments).is_err() {
                    return Err(Error::InvalidBlob(sidecar.id()));
                }
            }

            // Indices are unique and in range, so this can't underflow.
            let missing = commitments.len() - sidecars.len();
            if missing > 0 && block.block.slot() <= max_blob_slot {
                return Err(Error::MissingBlobs {
                    block_root,
                    missing,
                });
            }

            let cached_data = Arc::new(AvailabilityCache::new(
                block_root,
                block.block.fork_name(spec),
            ));
            cached_data.set_expected_blobs(commitments.len(), blobs_source)?;
            for sidecar in sidecars {
                cached_data.insert(sidecar, blobs_source)?;
            }
            responses.push(BlockInput::with_cached_data(
                spec,
                block,
                block_source,
                cached_data,
            )?);
        }

        if let Some(block_root) = sidecars_by_root.into_keys().next() {
            return Err(Error::UnexpectedBlobs { block_root });
        }

        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{
        BeaconBlock, BeaconBlockBody, Blob, ForkName, KzgCommitments, KzgProof, Signature,
        SignedBeaconBlock,
    };

    fn spec() -> ChainSpec {
        ForkName::Deneb.make_genesis_spec(ChainSpec::minimal())
    }

    fn block(slot: u64, num_blobs: u8) -> RpcBlock {
        SignedBeaconBlock::from_block(
            BeaconBlock {
                slot: Slot::new(slot),
                body: BeaconBlockBody {
                    blob_kzg_commitments: KzgCommitments::new(
                        (0..num_blobs).map(|i| KzgCommitment([i + 1; 48])).collect(),
                    )
                    .unwrap(),
                    ..Default::default()
                },
                ..Default::default()
            },
            Signature::empty(),
        )
        .into()
    }

    fn sidecars(block: &RpcBlock) -> Vec<Arc<BlobSidecar>> {
        (0..block.block.message.body.blob_kzg_commitments.len())
            .map(|index| {
                Arc::new(
                    BlobSidecar::new_with_existing_proof(
                        index,
                        Blob::new(vec![index as u8; 8]),
                        &block.block,
                        ForkName::Deneb,
                        block.block.signed_block_header(),
                        KzgProof::empty(),
                    )
                    .unwrap(),
                )
            })
            .collect()
    }

    fn request(blocks: &[RpcBlock], blobs: Vec<Arc<BlobSidecar>>) -> BlocksAndBlobsRequestInfo {
        let mut info = BlocksAndBlobsRequestInfo::new(BlockSource::ByRange, BlobsSource::ByRange);
        for block in blocks {
            info.add_block_response(Some(block.clone()));
        }
        info.add_block_response(None);
        for blob in blobs {
            info.add_sidecar_response(Some(blob));
        }
        info.add_sidecar_response(None);
        info
    }

    #[test]
    fn pairs_blobs_regardless_of_order() {
        let blocks = vec![block(1, 2), block(2, 0), block(3, 1)];
        let mut blobs: Vec<_> = blocks.iter().flat_map(sidecars).collect();
        blobs.reverse();

        let info = request(&blocks, blobs);
        assert!(info.is_finished());
        let responses = info.into_responses(&spec(), Slot::max_value()).unwrap();

        assert_eq!(responses.len(), 3);
        for (response, block) in responses.into_iter().zip(&blocks) {
            let available = response.into_available().unwrap();
            assert_eq!(available.block_root(), block.canonical_root());
            assert_eq!(
                available.blobs().len(),
                block.block.message.body.blob_kzg_commitments.len()
            );
            assert_eq!(available.blobs_source(), BlobsSource::ByRange);
        }
    }

    #[test]
    fn incomplete_block_within_horizon_fails() {
        let blocks = vec![block(4, 2)];
        let mut blobs = sidecars(&blocks[0]);
        blobs.pop();

        let err = request(&blocks, blobs)
            .into_responses(&spec(), Slot::new(4))
            .unwrap_err();
        assert_eq!(
            err,
            Error::MissingBlobs {
                block_root: blocks[0].canonical_root(),
                missing: 1
            }
        );
    }

    #[test]
    fn incomplete_block_beyond_horizon_is_pending() {
        let blocks = vec![block(4, 2)];
        let mut blobs = sidecars(&blocks[0]);
        blobs.pop();

        let responses = request(&blocks, blobs)
            .into_responses(&spec(), Slot::new(3))
            .unwrap();
        let BlockInput::Pending(pending) = &responses[0] else {
            panic!("expected a pending input");
        };
        assert_eq!(pending.cached_data().indices(), vec![0]);
        assert_eq!(pending.cached_data().num_missing(), Some(1));
    }

    #[test]
    fn unmatched_blob_fails() {
        let blocks = vec![block(1, 1)];
        let other = block(2, 1);

        let err = request(&blocks, [sidecars(&blocks[0]), sidecars(&other)].concat())
            .into_responses(&spec(), Slot::max_value())
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedBlobs {
                block_root: other.canonical_root()
            }
        );
    }

    #[test]
    fn duplicate_blob_fails() {
        let blocks = vec![block(1, 1)];
        let blob = sidecars(&blocks[0]).remove(0);

        let err = request(&blocks, vec![blob.clone(), blob.clone()])
            .into_responses(&spec(), Slot::max_value())
            .unwrap_err();
        assert_eq!(err, Error::DuplicateBlob(blob.id()));
    }

    #[test]
    fn mismatched_commitment_is_rejected() {
        let block = block(1, 2);
        let mut blob = (*sidecars(&block)[0]).clone();
        blob.kzg_commitment = KzgCommitment([0xff; 48]);

        assert_eq!(
            verify_blob_for_block(
                &blob,
                block.canonical_root(),
                block.block.blob_kzg_commitments(&spec())
            ),
            Err(BlobMismatch::CommitmentMismatch)
        );

        blob.kzg_commitment = block.block.message.body.blob_kzg_commitments[0];
        blob.index = 1;
        assert_eq!(
            verify_blob_for_block(
                &blob,
                block.canonical_root(),
                block.block.blob_kzg_commitments(&spec())
            ),
            Err(BlobMismatch::CommitmentMismatch)
        );

        blob.kzg_commitment = block.block.message.body.blob_kzg_commitments[1];
        assert_eq!(
            verify_blob_for_block(
                &blob,
                block.canonical_root(),
                block.block.blob_kzg_commitments(&spec())
            ),
            Err(BlobMismatch::InvalidInclusionProof)
        );
    }
}
