use crate::availability_cache::AvailabilityError;
use types::{BlobIdentifier, Hash256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The peer could not serve the block for this root.
    BlockNotFound(Hash256),
    /// The peer served a block that does not hash to the requested root.
    BlockRootMismatch { expected: Hash256, received: Hash256 },
    /// Every source was tried and some blobs are still missing. Another peer may have them.
    MissingBlobs { block_root: Hash256, missing: usize },
    /// The peer served blobs for a block that was not part of the response.
    UnexpectedBlobs { block_root: Hash256 },
    /// The peer served a blob that does not belong to its block.
    InvalidBlob(BlobIdentifier),
    /// The peer served the same blob twice.
    DuplicateBlob(BlobIdentifier),
    Availability(AvailabilityError),
}

impl Error {
    /// Whether asking another peer could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::MissingBlobs { .. })
    }
}

impl From<AvailabilityError> for Error {
    fn from(e: AvailabilityError) -> Self {
        Error::Availability(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingBlobs { missing, .. } => {
                write!(f, "Not all blobs fetched missingBlobs={}", missing)
            }
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_blobs_is_retryable() {
        let root = Hash256::repeat_byte(1);
        assert!(Error::MissingBlobs {
            block_root: root,
            missing: 1
        }
        .is_retryable());
        assert!(!Error::BlockNotFound(root).is_retryable());
        assert!(!Error::UnexpectedBlobs { block_root: root }.is_retryable());
    }

    #[test]
    fn missing_blobs_message() {
        let error = Error::MissingBlobs {
            block_root: Hash256::zero(),
            missing: 1,
        };
        assert_eq!(error.to_string(), "Not all blobs fetched missingBlobs=1");
    }
}
