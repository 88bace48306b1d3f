//! Ethereum consensus types needed to resolve blob availability.
//!
//! Roots are computed with `tree_hash` so that block roots, body roots and blob inclusion proofs
//! agree with what peers compute for the same data.

pub mod beacon_block;
pub mod beacon_block_body;
pub mod beacon_block_header;
pub mod blob;
pub mod blob_sidecar;
pub mod chain_spec;
pub mod fork_name;
pub mod kzg_commitment;
pub mod kzg_proof;
pub mod merkle;
pub mod signature;
pub mod slot_epoch;
pub mod test_utils;

pub use crate::beacon_block::{BeaconBlock, SignedBeaconBlock};
pub use crate::beacon_block_body::{
    compute_inclusion_proof, BeaconBlockBody, InclusionProofError, KzgCommitments,
    MaxBlobCommitmentsPerBlock, KZG_COMMITMENT_INCLUSION_PROOF_DEPTH,
};
pub use crate::beacon_block_header::{BeaconBlockHeader, SignedBeaconBlockHeader};
pub use crate::blob::{Blob, BlobAndProof};
pub use crate::blob_sidecar::{BlobIdentifier, BlobSidecar, BlobSidecarError, BlobSidecarList};
pub use crate::chain_spec::ChainSpec;
pub use crate::fork_name::ForkName;
pub use crate::kzg_commitment::{kzg_commitment_to_versioned_hash, KzgCommitment};
pub use crate::kzg_proof::KzgProof;
pub use crate::signature::Signature;
pub use crate::slot_epoch::{Epoch, Slot};

pub type Hash256 = ethereum_types::H256;
/// A KZG commitment hashed with a version prefix, as used by the execution layer.
pub type VersionedHash = Hash256;
