use crate::{
    BeaconBlockBody, BeaconBlockHeader, ChainSpec, ForkName, Hash256, KzgCommitment,
    SignedBeaconBlockHeader, Signature, Slot,
};
use tree_hash::TreeHash;

/// A block of the `BeaconChain`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct BeaconBlock {
    pub slot: Slot,
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBody,
}

impl BeaconBlock {
    /// Returns a full `BeaconBlockHeader` of this block.
    pub fn block_header(&self) -> BeaconBlockHeader {
        BeaconBlockHeader {
            slot: self.slot,
            proposer_index: self.proposer_index,
            parent_root: self.parent_root,
            state_root: self.state_root,
            body_root: self.body.tree_hash_root(),
        }
    }

    /// Returns the `tree_hash_root` of the block.
    pub fn canonical_root(&self) -> Hash256 {
        self.block_header().canonical_root()
    }
}

/// A `BeaconBlock` and a signature from its proposer.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: Signature,
}

impl SignedBeaconBlock {
    pub fn from_block(block: BeaconBlock, signature: Signature) -> Self {
        Self {
            message: block,
            signature,
        }
    }

    pub fn message(&self) -> &BeaconBlock {
        &self.message
    }

    pub fn slot(&self) -> Slot {
        self.message.slot
    }

    pub fn parent_root(&self) -> Hash256 {
        self.message.parent_root
    }

    /// Returns the `tree_hash_root` of the block.
    pub fn canonical_root(&self) -> Hash256 {
        self.message.canonical_root()
    }

    pub fn fork_name(&self, spec: &ChainSpec) -> ForkName {
        spec.fork_name_at_slot(self.slot())
    }

    /// Produce a signed beacon block header corresponding to this block.
    pub fn signed_block_header(&self) -> SignedBeaconBlockHeader {
        SignedBeaconBlockHeader {
            message: self.message.block_header(),
            signature: self.signature,
        }
    }

    /// The commitments this block makes to blobs. Blocks before Deneb make none, whatever their
    /// body holds.
    pub fn blob_kzg_commitments(&self, spec: &ChainSpec) -> &[KzgCommitment] {
        if self.fork_name(spec).deneb_enabled() {
            &*self.message.body.blob_kzg_commitments
        } else {
            &[]
        }
    }

    /// The number of blobs that must be available before this block can be imported.
    pub fn num_expected_blobs(&self, spec: &ChainSpec) -> usize {
        self.blob_kzg_commitments(spec).len()
    }
}
