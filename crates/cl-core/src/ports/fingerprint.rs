use anyhow::Result;

use crate::Fingerprint;

/// Turns clipboard payloads into comparable fingerprints.
pub trait FingerprintPort: Send + Sync {
    fn text(&self, text: &str) -> Fingerprint;

    /// Fails when `bytes` cannot be decoded as an image.
    fn image(&self, bytes: &[u8]) -> Result<Fingerprint>;
}
