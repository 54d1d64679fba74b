use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintAlgorithm {
    /// BLAKE3 over the UTF-8 bytes of the text.
    Blake3TextV1,
    /// BLAKE3 over the RGBA pixels of a fixed-size thumbnail.
    Blake3ThumbnailV1,
}

/// Deterministic digest of a clipboard payload.
///
/// Two fingerprints only compare equal when both the algorithm and the digest
/// match, so a text value can never collide with an image value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub alg: FingerprintAlgorithm,
    pub bytes: [u8; 32],
}

impl Fingerprint {
    pub fn new(alg: FingerprintAlgorithm, bytes: [u8; 32]) -> Self {
        Self { alg, bytes }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// First 12 hex chars, enough to tell values apart in logs.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.alg {
            FingerprintAlgorithm::Blake3TextV1 => "text",
            FingerprintAlgorithm::Blake3ThumbnailV1 => "thumb",
        };
        write!(f, "{}:{}", prefix, self.to_hex())
    }
}
