//! Resolves the missing blobs of a pending block input.
//!
//! Blobs are looked for in order of cost: the local availability cache, answers the execution
//! engine gave on earlier attempts, the execution engine itself and finally the peer. The engine
//! is skipped entirely for blocks that have been attempted before, since it already failed to
//! produce their blobs once.
use crate::availability_cache::AvailabilityCache;
use crate::block_input::{AvailableBlock, BlobsSource, BlockInput, BlockSource, RpcBlock};
use crate::block_sidecar_coupling::{verify_blob_for_block, BlocksAndBlobsRequestInfo};
use crate::caches::{EngineBlobsCache, ResolverCaches};
use crate::errors::Error;
use crate::execution::ExecutionEngine;
use crate::metrics;
use crate::network::{NetworkRequester, PeerId};
use itertools::Itertools;
use slog::{debug, warn, Logger};
use std::collections::HashMap;
use std::sync::Arc;
use types::{
    BlobAndProof, BlobIdentifier, BlobSidecar, ChainSpec, ForkName, Hash256, KzgCommitment,
    SignedBeaconBlock, SignedBeaconBlockHeader, Slot, VersionedHash,
};

/// Where each missing blob of a block will be looked for.
#[derive(Debug, Default, PartialEq)]
pub struct MissingBlobsPlan {
    /// Blobs the execution engine returned on an earlier attempt.
    pub from_engine_cache: Vec<(usize, BlobAndProof)>,
    /// Blobs the execution engine has not been asked about yet.
    pub from_engine: Vec<(usize, VersionedHash)>,
    /// Blobs to request from the peer.
    pub from_network: Vec<usize>,
}

/// Sorts every index of `commitments` missing from `cached_data` into exactly one source.
///
/// Blocks that have been tried before skip the engine and its cache.
pub fn plan_missing_blobs(
    commitments: &[KzgCommitment],
    cached_data: &AvailabilityCache,
    engine_blobs: &EngineBlobsCache,
    tried_before: bool,
) -> MissingBlobsPlan {
    let mut plan = MissingBlobsPlan::default();

    for (index, commitment) in commitments.iter().enumerate() {
        if cached_data.contains(index as u64) {
            metrics::inc_counter(&metrics::BLOBS_ALREADY_AVAILABLE);
            continue;
        }

        if tried_before {
            plan.from_network.push(index);
            continue;
        }

        let versioned_hash = commitment.calculate_versioned_hash();
        match engine_blobs.get(&versioned_hash) {
            Some(Some(blob_and_proof)) => {
                metrics::inc_counter(&metrics::ENGINE_BLOBS_CACHE_HITS);
                plan.from_engine_cache.push((index, blob_and_proof));
            }
            Some(None) => {
                metrics::inc_counter(&metrics::ENGINE_BLOBS_CACHE_NULL_HITS);
                plan.from_network.push(index);
            }
            None => {
                metrics::inc_counter(&metrics::ENGINE_BLOBS_CACHE_MISSES);
                plan.from_engine.push((index, versioned_hash));
            }
        }
    }

    plan
}

pub struct BlobResolver<N, E> {
    network: Arc<N>,
    execution_engine: Arc<E>,
    caches: Arc<ResolverCaches>,
    spec: Arc<ChainSpec>,
    log: Logger,
}

impl<N: NetworkRequester, E: ExecutionEngine> BlobResolver<N, E> {
    pub fn new(
        network: Arc<N>,
        execution_engine: Arc<E>,
        caches: Arc<ResolverCaches>,
        spec: Arc<ChainSpec>,
        log: Logger,
    ) -> Self {
        Self {
            network,
            execution_engine,
            caches,
            spec,
            log,
        }
    }

    pub fn caches(&self) -> &Arc<ResolverCaches> {
        &self.caches
    }

    /// Makes `block_input` available by fetching whatever it is missing, including the block
    /// itself if only its root is known.
    ///
    /// Fails with `Error::MissingBlobs` if some blobs could not be found anywhere. The blobs that
    /// were found stay in the input's availability cache, so a retry against another peer only
    /// requests the rest.
    pub async fn unavailable_blobs_by_root(
        &self,
        peer_id: &PeerId,
        block_input: BlockInput,
    ) -> Result<AvailableBlock, Error> {
        let pending = match block_input {
            BlockInput::Available(available) => return Ok(available),
            BlockInput::Pending(pending) => pending,
        };
        let _timer = metrics::start_timer(&metrics::RESOLUTION_TIMES);

        let (block_root, block, _, cached_data) = pending.into_parts();
        let RpcBlock {
            block,
            bytes: block_bytes,
        } = match block {
            Some(block) => block,
            None => self.fetch_block(peer_id, block_root).await?,
        };

        let expected_blobs = block.num_expected_blobs(&self.spec);
        cached_data.set_expected_blobs(expected_blobs, BlobsSource::ByRoot)?;
        if let Some(blobs) = cached_data.completed() {
            return Ok(AvailableBlock::new(
                &self.spec,
                block,
                BlockSource::ByRoot,
                block_bytes,
                blobs,
            )?);
        }

        metrics::inc_counter(&metrics::BLOCK_INPUTS_TRIED);
        let tried_before = self.caches.retry_tracker.record_attempt(block_root);
        if tried_before {
            metrics::inc_counter(&metrics::BLOCK_INPUTS_RETRIED);
        }

        let fork = block.fork_name(&self.spec);
        let commitments = block.blob_kzg_commitments(&self.spec);
        let signed_block_header = block.signed_block_header();
        let plan = plan_missing_blobs(
            commitments,
            &cached_data,
            &self.caches.engine_blobs,
            tried_before,
        );

        debug!(
            self.log,
            "Resolving unavailable blobs";
            "block_root" => ?block_root,
            "slot" => %block.slot(),
            "expected_blobs" => commitments.len(),
            "available" => cached_data.len(),
            "from_engine_cache" => plan.from_engine_cache.len(),
            "from_engine" => plan.from_engine.len(),
            "from_network" => plan.from_network.len(),
            "tried_before" => tried_before,
            "peer_id" => %peer_id,
        );

        let MissingBlobsPlan {
            from_engine_cache,
            from_engine,
            mut from_network,
        } = plan;
        let mut used_engine = false;

        for (index, blob_and_proof) in from_engine_cache {
            if self.import_engine_blob(
                &block,
                fork,
                &signed_block_header,
                index,
                blob_and_proof,
                &cached_data,
            ) {
                used_engine = true;
            } else {
                from_network.push(index);
            }
        }

        if !from_engine.is_empty() {
            let versioned_hashes = from_engine.iter().map(|(_, hash)| *hash).collect::<Vec<_>>();
            metrics::inc_counter(&metrics::ENGINE_GET_BLOBS_REQUESTS);
            metrics::inc_counter_by(
                &metrics::ENGINE_GET_BLOBS_REQUESTED,
                versioned_hashes.len() as u64,
            );

            let response = match self
                .execution_engine
                .get_blobs(fork, versioned_hashes)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        self.log,
                        "Failed to fetch blobs from the execution engine";
                        "error" => ?e,
                        "block_root" => ?block_root,
                    );
                    metrics::inc_counter(&metrics::ENGINE_GET_BLOBS_ERRORS);
                    vec![]
                }
            };

            // Short responses are treated as if the trailing blobs were absent.
            let mut response = response.into_iter();
            for (index, versioned_hash) in from_engine {
                let blob_and_proof = response.next().flatten();
                self.caches
                    .engine_blobs
                    .insert(versioned_hash, blob_and_proof.clone());

                match blob_and_proof {
                    Some(blob_and_proof) => {
                        metrics::inc_counter(&metrics::ENGINE_GET_BLOBS_RETURNED);
                        if cached_data.contains(index as u64) {
                            metrics::inc_counter(&metrics::BLOBS_DELAYED_GOSSIP_SAVED_COMPUTE);
                        } else if self.import_engine_blob(
                            &block,
                            fork,
                            &signed_block_header,
                            index,
                            blob_and_proof,
                            &cached_data,
                        ) {
                            metrics::inc_counter(&metrics::ENGINE_GET_BLOBS_USEFUL);
                            used_engine = true;
                        } else {
                            from_network.push(index);
                        }
                    }
                    None => {
                        metrics::inc_counter(&metrics::ENGINE_GET_BLOBS_NULL);
                        if cached_data.contains(index as u64) {
                            metrics::inc_counter(&metrics::BLOBS_DELAYED_GOSSIP_AVAILABLE);
                        } else {
                            from_network.push(index);
                        }
                    }
                }
            }
        }

        // Every cache insertion for this attempt has happened, so the caches can be bounded
        // before waiting on the peer.
        self.prune_caches();

        if !from_network.is_empty() {
            from_network.sort_unstable();
            let blob_ids = from_network
                .iter()
                .map(|&index| BlobIdentifier {
                    block_root,
                    index: index as u64,
                })
                .collect::<Vec<_>>();
            self.fetch_network_blobs(
                peer_id,
                block_root,
                blob_ids,
                commitments,
                &cached_data,
                tried_before,
            )
            .await;
        }

        let Some(blobs) = cached_data.completed() else {
            let missing = cached_data.num_missing().unwrap_or_default();
            metrics::inc_counter(&metrics::BLOCK_INPUTS_UNAVAILABLE);
            debug!(
                self.log,
                "Blobs still unavailable after resolution";
                "block_root" => ?block_root,
                "missing" => missing,
                "peer_id" => %peer_id,
            );
            return Err(Error::MissingBlobs {
                block_root,
                missing,
            });
        };

        metrics::inc_counter(&metrics::BLOCK_INPUTS_AVAILABLE);
        if used_engine {
            metrics::inc_counter(&metrics::BLOCK_INPUTS_AVAILABLE_USING_ENGINE);
        }
        if tried_before {
            metrics::inc_counter(&metrics::BLOCK_INPUTS_RETRIED_AVAILABLE);
        }
        let source: &'static str = blobs.blobs_source.into();
        metrics::inc_counter_vec(&metrics::AVAILABILITY_SOURCE, &[source]);

        Ok(AvailableBlock::new(
            &self.spec,
            block,
            BlockSource::ByRoot,
            block_bytes,
            blobs,
        )?)
    }

    /// Fetches `block_roots` and all of their blobs from `peer_id`.
    ///
    /// Every block must come back complete. A block the peer doesn't serve fails with
    /// `Error::BlockNotFound`. A root requested more than once yields a single block.
    pub async fn blocks_maybe_blobs_by_root(
        &self,
        peer_id: &PeerId,
        block_roots: Vec<Hash256>,
    ) -> Result<Vec<AvailableBlock>, Error> {
        let block_roots = block_roots.into_iter().unique().collect::<Vec<_>>();
        let response = match self
            .network
            .blocks_by_root(peer_id, block_roots.clone())
            .await
        {
            Ok(blocks) => blocks,
            Err(e) => {
                debug!(
                    self.log,
                    "Failed to fetch blocks by root";
                    "error" => ?e,
                    "peer_id" => %peer_id,
                );
                vec![]
            }
        };
        let mut blocks_by_root = response
            .into_iter()
            .map(|block| (block.canonical_root(), block))
            .collect::<HashMap<_, _>>();

        let mut info = BlocksAndBlobsRequestInfo::new(BlockSource::ByRoot, BlobsSource::ByRoot);
        let mut blob_ids = vec![];
        for block_root in block_roots {
            let block = blocks_by_root
                .remove(&block_root)
                .ok_or(Error::BlockNotFound(block_root))?;
            blob_ids.extend(
                (0..block.block.num_expected_blobs(&self.spec)).map(|index| BlobIdentifier {
                    block_root,
                    index: index as u64,
                }),
            );
            info.add_block_response(Some(block));
        }
        info.add_block_response(None);

        if !blob_ids.is_empty() {
            metrics::inc_counter_by(&metrics::NETWORK_BLOBS_REQUESTED, blob_ids.len() as u64);
            match self.network.blobs_by_root(peer_id, blob_ids).await {
                Ok(sidecars) => {
                    metrics::inc_counter_by(
                        &metrics::NETWORK_BLOBS_RECEIVED,
                        sidecars.len() as u64,
                    );
                    for sidecar in sidecars {
                        info.add_sidecar_response(Some(sidecar));
                    }
                }
                Err(e) => {
                    metrics::inc_counter(&metrics::NETWORK_REQUEST_ERRORS);
                    debug!(
                        self.log,
                        "Failed to fetch blobs by root";
                        "error" => ?e,
                        "peer_id" => %peer_id,
                    );
                }
            }
        }
        info.add_sidecar_response(None);

        info.into_responses(&self.spec, Slot::max_value())?
            .into_iter()
            .map(|input| match input {
                BlockInput::Available(available) => Ok(available),
                BlockInput::Pending(pending) => Err(Error::MissingBlobs {
                    block_root: pending.block_root(),
                    missing: pending.cached_data().num_missing().unwrap_or_default(),
                }),
            })
            .collect()
    }

    async fn fetch_block(&self, peer_id: &PeerId, block_root: Hash256) -> Result<RpcBlock, Error> {
        let blocks = self
            .network
            .blocks_by_root(peer_id, vec![block_root])
            .await
            .map_err(|e| {
                debug!(
                    self.log,
                    "Failed to fetch block by root";
                    "error" => ?e,
                    "block_root" => ?block_root,
                    "peer_id" => %peer_id,
                );
                Error::BlockNotFound(block_root)
            })?;

        let block = blocks
            .into_iter()
            .next()
            .ok_or(Error::BlockNotFound(block_root))?;
        let received = block.canonical_root();
        if received != block_root {
            return Err(Error::BlockRootMismatch {
                expected: block_root,
                received,
            });
        }
        Ok(block)
    }

    async fn fetch_network_blobs(
        &self,
        peer_id: &PeerId,
        block_root: Hash256,
        blob_ids: Vec<BlobIdentifier>,
        commitments: &[KzgCommitment],
        cached_data: &AvailabilityCache,
        tried_before: bool,
    ) {
        let requested = blob_ids.len() as u64;
        metrics::inc_counter_by(&metrics::NETWORK_BLOBS_REQUESTED, requested);
        if tried_before {
            metrics::inc_counter_by(&metrics::NETWORK_BLOBS_RETRIED_REQUESTED, requested);
        }

        let sidecars = match self.network.blobs_by_root(peer_id, blob_ids).await {
            Ok(sidecars) => sidecars,
            Err(e) => {
                metrics::inc_counter(&metrics::NETWORK_REQUEST_ERRORS);
                warn!(
                    self.log,
                    "Failed to fetch blobs by root";
                    "error" => ?e,
                    "block_root" => ?block_root,
                    "peer_id" => %peer_id,
                );
                return;
            }
        };

        let received = sidecars.len() as u64;
        metrics::inc_counter_by(&metrics::NETWORK_BLOBS_RECEIVED, received);
        if tried_before {
            metrics::inc_counter_by(&metrics::NETWORK_BLOBS_RETRIED_RECEIVED, received);
        }

        for sidecar in sidecars {
            if let Err(reason) = verify_blob_for_block(&sidecar, block_root, commitments) {
                metrics::inc_counter(&metrics::NETWORK_BLOBS_INVALID);
                warn!(
                    self.log,
                    "Discarding invalid blob from peer";
                    "reason" => ?reason,
                    "blob_id" => ?sidecar.id(),
                    "peer_id" => %peer_id,
                );
                continue;
            }
            if let Err(e) = cached_data.insert(sidecar, BlobsSource::ByRoot) {
                warn!(
                    self.log,
                    "Failed to cache blob from peer";
                    "error" => ?e,
                    "block_root" => ?block_root,
                );
            }
        }
    }

    /// Builds a sidecar from an execution engine blob and caches it. Returns `false` if the blob
    /// could not be used.
    fn import_engine_blob(
        &self,
        block: &SignedBeaconBlock,
        fork: ForkName,
        signed_block_header: &SignedBeaconBlockHeader,
        index: usize,
        blob_and_proof: BlobAndProof,
        cached_data: &AvailabilityCache,
    ) -> bool {
        let sidecar = match BlobSidecar::from_blob_and_proof(
            index,
            blob_and_proof,
            block,
            fork,
            *signed_block_header,
        ) {
            Ok(sidecar) => sidecar,
            Err(e) => {
                warn!(
                    self.log,
                    "Failed to build blob sidecar from engine blob";
                    "error" => ?e,
                    "index" => index,
                );
                return false;
            }
        };

        match cached_data.insert(Arc::new(sidecar), BlobsSource::Engine) {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    self.log,
                    "Failed to cache engine blob";
                    "error" => ?e,
                    "index" => index,
                );
                false
            }
        }
    }

    fn prune_caches(&self) {
        let engine_blobs = &self.caches.engine_blobs;
        let pruned = engine_blobs.prune();
        if pruned > 0 {
            metrics::inc_counter_by(&metrics::ENGINE_BLOBS_CACHE_PRUNED, pruned as u64);
        }
        metrics::set_gauge(&metrics::ENGINE_BLOBS_CACHE_SIZE, engine_blobs.len() as i64);

        let retry_tracker = &self.caches.retry_tracker;
        let pruned = retry_tracker.prune();
        if pruned > 0 {
            metrics::inc_counter_by(&metrics::RETRY_TRACKER_PRUNED, pruned as u64);
        }
        metrics::set_gauge(&metrics::RETRY_TRACKER_SIZE, retry_tracker.len() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::EngineError;
    use crate::network::NetworkError;
    use async_trait::async_trait;
    use types::test_utils::{test_rng, TestRandom};
    use types::{
        BeaconBlock, BeaconBlockBody, Blob, BlobSidecarList, KzgCommitments, KzgProof, Signature,
    };

    struct SilentPeer;

    #[async_trait]
    impl NetworkRequester for SilentPeer {
        async fn blocks_by_root(
            &self,
            _peer_id: &PeerId,
            _block_roots: Vec<Hash256>,
        ) -> Result<Vec<RpcBlock>, NetworkError> {
            Ok(vec![])
        }

        async fn blobs_by_root(
            &self,
            _peer_id: &PeerId,
            _blob_ids: Vec<BlobIdentifier>,
        ) -> Result<BlobSidecarList, NetworkError> {
            Ok(vec![])
        }
    }

    struct Engine {
        blobs: HashMap<VersionedHash, BlobAndProof>,
    }

    #[async_trait]
    impl ExecutionEngine for Engine {
        async fn get_blobs(
            &self,
            _fork: ForkName,
            versioned_hashes: Vec<VersionedHash>,
        ) -> Result<Vec<Option<BlobAndProof>>, EngineError> {
            Ok(versioned_hashes
                .iter()
                .map(|hash| self.blobs.get(hash).cloned())
                .collect())
        }
    }

    #[tokio::test]
    async fn useful_engine_blobs_are_counted_individually() {
        let mut rng = test_rng();
        let spec = ForkName::Deneb.make_genesis_spec(ChainSpec::minimal());
        let commitments = (0..4)
            .map(|_| KzgCommitment::random_for_test(&mut rng))
            .collect::<Vec<_>>();
        // The engine knows every blob but the last.
        let blobs = commitments
            .iter()
            .take(3)
            .map(|commitment| {
                let blob_and_proof = BlobAndProof {
                    blob: Blob::random_for_test(&mut rng),
                    proof: KzgProof::random_for_test(&mut rng),
                };
                (commitment.calculate_versioned_hash(), blob_and_proof)
            })
            .collect();
        let block = SignedBeaconBlock::from_block(
            BeaconBlock {
                slot: Slot::new(1),
                body: BeaconBlockBody {
                    blob_kzg_commitments: KzgCommitments::new(commitments).unwrap(),
                    ..Default::default()
                },
                ..Default::default()
            },
            Signature::empty(),
        );
        let resolver = BlobResolver::new(
            Arc::new(SilentPeer),
            Arc::new(Engine { blobs }),
            Arc::new(ResolverCaches::default()),
            Arc::new(spec.clone()),
            logging::test_logger(),
        );
        let input =
            BlockInput::new(&spec, RpcBlock::new(Arc::new(block), None), BlockSource::Gossip)
                .unwrap();

        let useful = || {
            crate::metrics::ENGINE_GET_BLOBS_USEFUL
                .as_ref()
                .unwrap()
                .get()
        };
        let before = useful();
        let result = resolver
            .unavailable_blobs_by_root(&PeerId::from("peer-0"), input)
            .await;

        assert!(matches!(
            result,
            Err(Error::MissingBlobs { missing: 1, .. })
        ));
        assert_eq!(useful() - before, 3);
    }
}
