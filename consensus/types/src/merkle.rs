//! Merkle proofs over fixed-depth, right-sparse binary trees.
//!
//! Roots of SSZ types come from `tree_hash`; this module only builds and checks branches. Only
//! the first `leaves.len()` leaves of a tree are populated, everything to their right is a zero
//! subtree, so building a proof costs `O(leaves.len())` regardless of depth.
use crate::Hash256;
use ethereum_hashing::hash32_concat;
use lazy_static::lazy_static;

pub const MAX_TREE_DEPTH: usize = 32;

lazy_static! {
    /// Cached zero hashes where `ZERO_HASHES[i]` is the hash of a Merkle tree with 2^i zero leaves.
    static ref ZERO_HASHES: Vec<Hash256> = {
        let mut hashes = vec![Hash256::zero(); MAX_TREE_DEPTH + 1];

        for i in 0..MAX_TREE_DEPTH {
            hashes[i + 1] = hash_concat(hashes[i], hashes[i]);
        }

        hashes
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerkleError {
    DepthTooLarge(usize),
    TooManyLeaves { leaves: usize, depth: usize },
    IndexOutOfBounds { index: usize, depth: usize },
}

pub fn hash_concat(h1: Hash256, h2: Hash256) -> Hash256 {
    Hash256::from(hash32_concat(h1.as_bytes(), h2.as_bytes()))
}

/// The root of a tree of the given depth whose leaves are all zero.
pub fn zero_hash(depth: usize) -> Hash256 {
    ZERO_HASHES[depth.min(MAX_TREE_DEPTH)]
}

fn check_shape(leaves: usize, depth: usize) -> Result<(), MerkleError> {
    if depth > MAX_TREE_DEPTH {
        return Err(MerkleError::DepthTooLarge(depth));
    }
    if leaves > 1 << depth {
        return Err(MerkleError::TooManyLeaves { leaves, depth });
    }
    Ok(())
}

/// Builds every layer of the populated part of the tree, leaves first.
fn build_layers(leaves: &[Hash256], depth: usize) -> Vec<Vec<Hash256>> {
    let mut layers = Vec::with_capacity(depth + 1);
    let mut current = leaves.to_vec();

    for level in 0..depth {
        let next = current
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).copied().unwrap_or_else(|| zero_hash(level));
                hash_concat(pair[0], right)
            })
            .collect();
        layers.push(std::mem::replace(&mut current, next));
    }
    layers.push(current);

    layers
}

/// Compute the root of a tree of `depth` with the given leaves packed to the left.
pub fn merkle_root(leaves: &[Hash256], depth: usize) -> Result<Hash256, MerkleError> {
    check_shape(leaves.len(), depth)?;

    Ok(build_layers(leaves, depth)
        .last()
        .and_then(|top| top.first().copied())
        .unwrap_or_else(|| zero_hash(depth)))
}

/// Return a Merkle proof of inclusion for the leaf at `index`.
///
/// The proof is in "bottom-up" order, starting with the sibling of the leaf and moving up the
/// tree. Its length will be exactly equal to `depth`.
pub fn generate_proof(
    leaves: &[Hash256],
    depth: usize,
    index: usize,
) -> Result<Vec<Hash256>, MerkleError> {
    check_shape(leaves.len(), depth)?;
    if index >= 1 << depth {
        return Err(MerkleError::IndexOutOfBounds { index, depth });
    }

    let layers = build_layers(leaves, depth);
    let proof = (0..depth)
        .map(|level| {
            let sibling = (index >> level) ^ 1;
            layers[level]
                .get(sibling)
                .copied()
                .unwrap_or_else(|| zero_hash(level))
        })
        .collect();

    Ok(proof)
}

/// Verify a proof that `leaf` exists at `index` in a Merkle tree rooted at `root`.
///
/// The `branch` argument is the main component of the proof: it should be a list of internal
/// node hashes such that the root can be reconstructed (in bottom-up order).
pub fn verify_merkle_proof(
    leaf: Hash256,
    branch: &[Hash256],
    depth: usize,
    index: usize,
    root: Hash256,
) -> bool {
    if branch.len() == depth {
        merkle_root_from_branch(leaf, branch, depth, index) == root
    } else {
        false
    }
}

/// Compute a root hash from a leaf and a Merkle proof.
pub fn merkle_root_from_branch(
    leaf: Hash256,
    branch: &[Hash256],
    depth: usize,
    index: usize,
) -> Hash256 {
    let mut merkle_root = leaf;

    for (i, sibling) in branch.iter().enumerate().take(depth) {
        let ith_bit = (index >> i) & 0x01;
        if ith_bit == 1 {
            merkle_root = hash_concat(*sibling, merkle_root);
        } else {
            merkle_root = hash_concat(merkle_root, *sibling);
        }
    }

    merkle_root
}
