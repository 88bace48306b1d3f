use crate::merkle::{generate_proof, MerkleError};
use crate::{ForkName, Hash256, KzgCommitment};
use ssz_types::typenum::U4096;
use ssz_types::VariableList;
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// `MAX_BLOB_COMMITMENTS_PER_BLOCK`, the list limit of `blob_kzg_commitments`.
pub type MaxBlobCommitmentsPerBlock = U4096;
pub type KzgCommitments = VariableList<KzgCommitment, MaxBlobCommitmentsPerBlock>;

/// Position of `blob_kzg_commitments` within the `BeaconBlockBody` container.
pub const BLOB_KZG_COMMITMENTS_INDEX: usize = 11;
/// Depth of a proof from a KZG commitment to the body root: 12 list levels, the length mix-in
/// and 4 container levels.
pub const KZG_COMMITMENT_INCLUSION_PROOF_DEPTH: usize = 17;

/// The 12 body fields pad out to 16 leaves.
const BODY_TREE_DEPTH: usize = 4;
const COMMITMENTS_TREE_DEPTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionProofError {
    /// Blocks before Deneb do not commit to blobs.
    IncorrectFork(ForkName),
    IndexOutOfBounds { index: usize, len: usize },
    Merkle(MerkleError),
}

impl From<MerkleError> for InclusionProofError {
    fn from(e: MerkleError) -> Self {
        InclusionProofError::Merkle(e)
    }
}

/// The body of a Deneb beacon block.
///
/// Only `blob_kzg_commitments` is held in full. Every other field is carried as its hash tree
/// root, which hashes to itself, so the body root matches that of the full body.
#[derive(Debug, Clone, Default, PartialEq, Eq, TreeHash)]
pub struct BeaconBlockBody {
    pub randao_reveal_root: Hash256,
    pub eth1_data_root: Hash256,
    pub graffiti: Hash256,
    pub proposer_slashings_root: Hash256,
    pub attester_slashings_root: Hash256,
    pub attestations_root: Hash256,
    pub deposits_root: Hash256,
    pub voluntary_exits_root: Hash256,
    pub sync_aggregate_root: Hash256,
    pub execution_payload_root: Hash256,
    pub bls_to_execution_changes_root: Hash256,
    pub blob_kzg_commitments: KzgCommitments,
}

impl BeaconBlockBody {
    pub fn blob_kzg_commitments(&self) -> &KzgCommitments {
        &self.blob_kzg_commitments
    }

    /// The roots of the container fields, in field order.
    fn field_leaves(&self) -> [Hash256; 12] {
        [
            self.randao_reveal_root.tree_hash_root(),
            self.eth1_data_root.tree_hash_root(),
            self.graffiti.tree_hash_root(),
            self.proposer_slashings_root.tree_hash_root(),
            self.attester_slashings_root.tree_hash_root(),
            self.attestations_root.tree_hash_root(),
            self.deposits_root.tree_hash_root(),
            self.voluntary_exits_root.tree_hash_root(),
            self.sync_aggregate_root.tree_hash_root(),
            self.execution_payload_root.tree_hash_root(),
            self.bls_to_execution_changes_root.tree_hash_root(),
            self.blob_kzg_commitments.tree_hash_root(),
        ]
    }

    /// Produces the proof of inclusion for the commitment at `index` in `self.tree_hash_root()`.
    pub fn kzg_commitment_merkle_proof(
        &self,
        index: usize,
    ) -> Result<Vec<Hash256>, InclusionProofError> {
        let len = self.blob_kzg_commitments.len();
        if index >= len {
            return Err(InclusionProofError::IndexOutOfBounds { index, len });
        }

        let commitment_leaves = self
            .blob_kzg_commitments
            .iter()
            .map(|commitment| commitment.tree_hash_root())
            .collect::<Vec<_>>();
        let mut proof = generate_proof(&commitment_leaves, COMMITMENTS_TREE_DEPTH, index)?;
        proof.push(len.tree_hash_root());
        proof.extend(generate_proof(
            &self.field_leaves(),
            BODY_TREE_DEPTH,
            BLOB_KZG_COMMITMENTS_INDEX,
        )?);

        debug_assert_eq!(proof.len(), KZG_COMMITMENT_INCLUSION_PROOF_DEPTH);
        Ok(proof)
    }
}

/// The leaf index of commitment `index` in the combined 17-level tree rooted at the body root.
pub fn kzg_commitment_subtree_index(index: usize) -> usize {
    // The commitment list data root is the left child of the length mix-in node.
    (BLOB_KZG_COMMITMENTS_INDEX << (COMMITMENTS_TREE_DEPTH + 1)) | index
}

/// Compute the inclusion proof of the commitment at `index` for a body of the given fork.
///
/// The proof depends only on the commitment list, never on the blob, so it can be recomputed for
/// blobs obtained from any source.
pub fn compute_inclusion_proof(
    fork: ForkName,
    body: &BeaconBlockBody,
    index: usize,
) -> Result<Vec<Hash256>, InclusionProofError> {
    if !fork.deneb_enabled() {
        return Err(InclusionProofError::IncorrectFork(fork));
    }
    body.kzg_commitment_merkle_proof(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::{merkle_root, verify_merkle_proof};

    fn body_with_commitments(n: u8) -> BeaconBlockBody {
        BeaconBlockBody {
            graffiti: Hash256::repeat_byte(0x42),
            execution_payload_root: Hash256::repeat_byte(0x09),
            blob_kzg_commitments: KzgCommitments::new(
                (0..n).map(|i| KzgCommitment([i + 1; 48])).collect(),
            )
            .unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn inclusion_proof_verifies_against_body_root() {
        let body = body_with_commitments(5);
        let body_root = body.tree_hash_root();

        for index in 0..5 {
            let proof = compute_inclusion_proof(ForkName::Deneb, &body, index).unwrap();
            assert_eq!(proof.len(), KZG_COMMITMENT_INCLUSION_PROOF_DEPTH);
            assert!(verify_merkle_proof(
                body.blob_kzg_commitments[index].tree_hash_root(),
                &proof,
                KZG_COMMITMENT_INCLUSION_PROOF_DEPTH,
                kzg_commitment_subtree_index(index),
                body_root,
            ));
        }
    }

    #[test]
    fn proof_for_wrong_index_does_not_verify() {
        let body = body_with_commitments(3);
        let proof = body.kzg_commitment_merkle_proof(1).unwrap();

        assert!(!verify_merkle_proof(
            body.blob_kzg_commitments[1].tree_hash_root(),
            &proof,
            KZG_COMMITMENT_INCLUSION_PROOF_DEPTH,
            kzg_commitment_subtree_index(2),
            body.tree_hash_root(),
        ));
    }

    #[test]
    fn proof_is_deterministic() {
        let body = body_with_commitments(4);
        assert_eq!(
            compute_inclusion_proof(ForkName::Electra, &body, 3),
            compute_inclusion_proof(ForkName::Electra, &body.clone(), 3)
        );
    }

    #[test]
    fn proof_errors() {
        let body = body_with_commitments(2);
        assert_eq!(
            compute_inclusion_proof(ForkName::Deneb, &body, 2),
            Err(InclusionProofError::IndexOutOfBounds { index: 2, len: 2 })
        );
        assert_eq!(
            compute_inclusion_proof(ForkName::Capella, &body, 0),
            Err(InclusionProofError::IncorrectFork(ForkName::Capella))
        );
    }

    #[test]
    fn proof_helper_agrees_with_tree_hash() {
        let body = body_with_commitments(6);
        let leaves = body
            .blob_kzg_commitments
            .iter()
            .map(|commitment| commitment.tree_hash_root())
            .collect::<Vec<_>>();
        let data_root = merkle_root(&leaves, COMMITMENTS_TREE_DEPTH).unwrap();

        assert_eq!(
            tree_hash::mix_in_length(&data_root, leaves.len()),
            body.blob_kzg_commitments.tree_hash_root()
        );
        assert_eq!(
            merkle_root(&body.field_leaves(), BODY_TREE_DEPTH),
            Ok(body.tree_hash_root())
        );
    }

    #[test]
    fn commitment_list_is_bounded() {
        let at_limit = vec![KzgCommitment::empty_for_testing(); 4096];
        assert!(KzgCommitments::new(at_limit).is_ok());

        let over_limit = vec![KzgCommitment::empty_for_testing(); 4097];
        assert!(KzgCommitments::new(over_limit).is_err());
    }

    #[test]
    fn commitments_change_body_root() {
        assert_ne!(
            body_with_commitments(1).tree_hash_root(),
            body_with_commitments(2).tree_hash_root()
        );
    }
}
