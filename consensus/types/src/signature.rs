use std::fmt;

pub const SIGNATURE_BYTES_LEN: usize = 96;

/// A compressed BLS signature. Signatures are carried, never verified, by this crate.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; SIGNATURE_BYTES_LEN]);

impl Signature {
    /// The compressed point at infinity.
    pub fn empty() -> Self {
        let mut bytes = [0; SIGNATURE_BYTES_LEN];
        bytes[0] = 0xc0;
        Self(bytes)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{}..)", hex::encode(&self.0[..8]))
    }
}
