use crate::VersionedHash;
use ethereum_hashing::hash_fixed;
use std::fmt;
use tree_hash::{PackedEncoding, TreeHash};

pub const BYTES_PER_COMMITMENT: usize = 48;
pub const VERSIONED_HASH_VERSION_KZG: u8 = 0x01;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KzgCommitment(pub [u8; BYTES_PER_COMMITMENT]);

impl KzgCommitment {
    pub fn calculate_versioned_hash(&self) -> VersionedHash {
        let mut versioned_hash = hash_fixed(&self.0);
        versioned_hash[0] = VERSIONED_HASH_VERSION_KZG;
        VersionedHash::from(versioned_hash)
    }

    pub fn empty_for_testing() -> Self {
        KzgCommitment([0; BYTES_PER_COMMITMENT])
    }
}

/// Derive the identifier the execution layer uses for the blob committed to by `kzg_commitment`.
pub fn kzg_commitment_to_versioned_hash(kzg_commitment: &KzgCommitment) -> VersionedHash {
    kzg_commitment.calculate_versioned_hash()
}

impl From<[u8; BYTES_PER_COMMITMENT]> for KzgCommitment {
    fn from(bytes: [u8; BYTES_PER_COMMITMENT]) -> Self {
        Self(bytes)
    }
}

impl TreeHash for KzgCommitment {
    fn tree_hash_type() -> tree_hash::TreeHashType {
        <[u8; BYTES_PER_COMMITMENT] as TreeHash>::tree_hash_type()
    }

    fn tree_hash_packed_encoding(&self) -> PackedEncoding {
        self.0.tree_hash_packed_encoding()
    }

    fn tree_hash_packing_factor() -> usize {
        <[u8; BYTES_PER_COMMITMENT] as TreeHash>::tree_hash_packing_factor()
    }

    fn tree_hash_root(&self) -> tree_hash::Hash256 {
        self.0.tree_hash_root()
    }
}

impl fmt::Display for KzgCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for KzgCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::hash_concat;
    use crate::Hash256;

    #[test]
    fn versioned_hash_has_kzg_version_prefix() {
        let commitment = KzgCommitment([7; BYTES_PER_COMMITMENT]);
        let versioned_hash = commitment.calculate_versioned_hash();
        let digest = hash_fixed(&commitment.0);

        assert_eq!(versioned_hash.as_bytes()[0], VERSIONED_HASH_VERSION_KZG);
        assert_eq!(&versioned_hash.as_bytes()[1..], &digest[1..]);
    }

    #[test]
    fn versioned_hash_is_deterministic_and_distinct() {
        let a = KzgCommitment([1; BYTES_PER_COMMITMENT]);
        let b = KzgCommitment([2; BYTES_PER_COMMITMENT]);

        assert_eq!(
            kzg_commitment_to_versioned_hash(&a),
            kzg_commitment_to_versioned_hash(&a)
        );
        assert_ne!(
            kzg_commitment_to_versioned_hash(&a),
            kzg_commitment_to_versioned_hash(&b)
        );
    }

    #[test]
    fn tree_hash_root_pads_second_chunk() {
        let mut bytes = [0; BYTES_PER_COMMITMENT];
        bytes[47] = 1;
        let commitment = KzgCommitment(bytes);

        let mut high = [0; 32];
        high[15] = 1;
        assert_eq!(
            commitment.tree_hash_root(),
            hash_concat(Hash256::zero(), Hash256::from(high))
        );
    }
}
