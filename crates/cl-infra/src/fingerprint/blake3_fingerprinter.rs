use anyhow::Result;
use cl_core::ports::FingerprintPort;
use cl_core::{Fingerprint, FingerprintAlgorithm};

use super::thumbnail::thumbnail_pixels;

pub struct Blake3Fingerprinter;

impl FingerprintPort for Blake3Fingerprinter {
    fn text(&self, text: &str) -> Fingerprint {
        let hash = blake3::hash(text.as_bytes());
        Fingerprint::new(FingerprintAlgorithm::Blake3TextV1, hash.into())
    }

    fn image(&self, bytes: &[u8]) -> Result<Fingerprint> {
        let pixels = thumbnail_pixels(bytes)?;
        let hash = blake3::hash(&pixels);
        tracing::trace!(
            source_bytes = bytes.len(),
            thumbnail_bytes = pixels.len(),
            "image fingerprinted"
        );
        Ok(Fingerprint::new(
            FingerprintAlgorithm::Blake3ThumbnailV1,
            hash.into(),
        ))
    }
}
