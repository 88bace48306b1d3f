//! Helpers for building deterministic, pseudo-random test data.
use crate::{Blob, Hash256, KzgCommitment, KzgProof};
use rand::RngCore;

pub use rand::rngs::StdRng;
pub use rand::SeedableRng;

pub trait TestRandom {
    fn random_for_test(rng: &mut impl RngCore) -> Self;
}

impl TestRandom for u64 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        rng.next_u64()
    }
}

impl TestRandom for Hash256 {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0; 32];
        rng.fill_bytes(&mut bytes);
        Hash256::from(bytes)
    }
}

impl TestRandom for KzgCommitment {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0; 48];
        rng.fill_bytes(&mut bytes);
        KzgCommitment(bytes)
    }
}

impl TestRandom for KzgProof {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bytes = [0; 48];
        rng.fill_bytes(&mut bytes);
        KzgProof(bytes)
    }
}

/// Short blobs keep tests fast; KZG verification is not performed on them.
pub const TEST_BLOB_LEN: usize = 128;

impl TestRandom for Blob {
    fn random_for_test(rng: &mut impl RngCore) -> Self {
        let mut bytes = vec![0; TEST_BLOB_LEN];
        rng.fill_bytes(&mut bytes);
        Blob::new(bytes)
    }
}

/// A seeded rng, so failures are reproducible.
pub fn test_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}
