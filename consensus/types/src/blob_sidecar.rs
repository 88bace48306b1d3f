use crate::beacon_block_body::{
    compute_inclusion_proof, kzg_commitment_subtree_index, InclusionProofError,
    KZG_COMMITMENT_INCLUSION_PROOF_DEPTH,
};
use crate::merkle::verify_merkle_proof;
use crate::{
    Blob, BlobAndProof, ForkName, Hash256, KzgCommitment, KzgProof, SignedBeaconBlock,
    SignedBeaconBlockHeader, Slot,
};
use derivative::Derivative;
use std::fmt;
use std::sync::Arc;
use tree_hash::TreeHash;

/// Container of the data that identifies an individual blob.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlobIdentifier {
    pub block_root: Hash256,
    pub index: u64,
}

impl PartialOrd for BlobIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Identifiers sort by index first so that a request for a single block is in index order.
impl Ord for BlobIdentifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.block_root.cmp(&other.block_root))
    }
}

impl fmt::Debug for BlobIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobIdentifier({:?}, {})", self.block_root, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobSidecarError {
    MissingKzgCommitment { index: usize, num_commitments: usize },
    InclusionProof(InclusionProofError),
}

impl From<InclusionProofError> for BlobSidecarError {
    fn from(e: InclusionProofError) -> Self {
        BlobSidecarError::InclusionProof(e)
    }
}

/// A blob together with everything needed to check it belongs to a particular block.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, Hash)]
pub struct BlobSidecar {
    pub index: u64,
    pub blob: Blob,
    pub kzg_commitment: KzgCommitment,
    pub kzg_proof: KzgProof,
    pub signed_block_header: SignedBeaconBlockHeader,
    /// Fully determined by the header and index.
    #[derivative(Hash = "ignore")]
    pub kzg_commitment_inclusion_proof: Vec<Hash256>,
}

impl BlobSidecar {
    /// Builds a sidecar for a blob whose KZG proof is already known (e.g. served by the
    /// execution layer), computing the commitment inclusion proof from `block`.
    pub fn new_with_existing_proof(
        index: usize,
        blob: Blob,
        block: &SignedBeaconBlock,
        fork: ForkName,
        signed_block_header: SignedBeaconBlockHeader,
        kzg_proof: KzgProof,
    ) -> Result<Self, BlobSidecarError> {
        let commitments = &block.message.body.blob_kzg_commitments;
        let kzg_commitment =
            *commitments
                .get(index)
                .ok_or(BlobSidecarError::MissingKzgCommitment {
                    index,
                    num_commitments: commitments.len(),
                })?;
        let kzg_commitment_inclusion_proof =
            compute_inclusion_proof(fork, &block.message.body, index)?;

        Ok(Self {
            index: index as u64,
            blob,
            kzg_commitment,
            kzg_proof,
            signed_block_header,
            kzg_commitment_inclusion_proof,
        })
    }

    /// Convenience wrapper for a response of `engine_getBlobsV1`.
    pub fn from_blob_and_proof(
        index: usize,
        blob_and_proof: BlobAndProof,
        block: &SignedBeaconBlock,
        fork: ForkName,
        signed_block_header: SignedBeaconBlockHeader,
    ) -> Result<Self, BlobSidecarError> {
        let BlobAndProof { blob, proof } = blob_and_proof;
        Self::new_with_existing_proof(index, blob, block, fork, signed_block_header, proof)
    }

    pub fn id(&self) -> BlobIdentifier {
        BlobIdentifier {
            block_root: self.block_root(),
            index: self.index,
        }
    }

    pub fn slot(&self) -> Slot {
        self.signed_block_header.message.slot
    }

    pub fn block_root(&self) -> Hash256 {
        self.signed_block_header.message.canonical_root()
    }

    pub fn block_parent_root(&self) -> Hash256 {
        self.signed_block_header.message.parent_root
    }

    pub fn block_proposer_index(&self) -> u64 {
        self.signed_block_header.message.proposer_index
    }

    /// Verifies the kzg commitment inclusion merkle proof against the header's body root.
    pub fn verify_blob_sidecar_inclusion_proof(&self) -> bool {
        verify_merkle_proof(
            self.kzg_commitment.tree_hash_root(),
            &self.kzg_commitment_inclusion_proof,
            KZG_COMMITMENT_INCLUSION_PROOF_DEPTH,
            kzg_commitment_subtree_index(self.index as usize),
            self.signed_block_header.message.body_root,
        )
    }
}

pub type BlobSidecarList = Vec<Arc<BlobSidecar>>;
