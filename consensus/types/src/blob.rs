use crate::KzgProof;
use std::fmt;
use std::sync::Arc;

pub const BYTES_PER_FIELD_ELEMENT: usize = 32;
pub const FIELD_ELEMENTS_PER_BLOB: usize = 4096;
pub const BYTES_PER_BLOB: usize = BYTES_PER_FIELD_ELEMENT * FIELD_ELEMENTS_PER_BLOB;

/// The raw bytes of a blob.
///
/// Blobs are large and frequently shared between sidecars, caches and engine responses, so the
/// bytes are reference counted and cloning a `Blob` never copies them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Blob(Arc<[u8]>);

impl Blob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Blob {
    fn default() -> Self {
        Self::new(vec![0; BYTES_PER_BLOB])
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.0[..self.0.len().min(4)];
        write!(f, "Blob(len: {}, 0x{}..)", self.0.len(), hex::encode(prefix))
    }
}

/// A blob and its KZG proof as served by the execution layer's `engine_getBlobsV1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobAndProof {
    pub blob: Blob,
    pub proof: KzgProof,
}
