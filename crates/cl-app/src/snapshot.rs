use std::sync::Arc;

use cl_core::clipboard::LocalSnapshots;
use cl_core::ports::{FingerprintPort, LocalClipboardPort};
use cl_core::{ClipboardKind, ClipboardSnapshot, Phase, SyncError};
use tokio::time::Instant;
use tracing::warn;

/// Samples the local clipboard into fingerprinted snapshots.
pub struct SnapshotCapture {
    clipboard: Arc<dyn LocalClipboardPort>,
    fingerprinter: Arc<dyn FingerprintPort>,
}

impl SnapshotCapture {
    pub fn new(
        clipboard: Arc<dyn LocalClipboardPort>,
        fingerprinter: Arc<dyn FingerprintPort>,
    ) -> Self {
        Self {
            clipboard,
            fingerprinter,
        }
    }

    /// Both channels at once. Fails if either channel cannot be read.
    pub fn capture_local(&self) -> Result<LocalSnapshots, SyncError> {
        Ok(LocalSnapshots {
            image: self.capture_local_image()?,
            text: self.capture_local_text()?,
        })
    }

    pub fn capture_local_text(&self) -> Result<Option<ClipboardSnapshot>, SyncError> {
        let text = self
            .clipboard
            .get_text()
            .map_err(|err| SyncError::local(Phase::Capture, err))?;
        Ok(text.and_then(|text| self.text_snapshot(text, Instant::now())))
    }

    /// A local image that cannot be decoded is logged and treated as absent.
    pub fn capture_local_image(&self) -> Result<Option<ClipboardSnapshot>, SyncError> {
        let Some(bytes) = self
            .clipboard
            .get_image()
            .map_err(|err| SyncError::local(Phase::Capture, err))?
        else {
            return Ok(None);
        };
        if bytes.is_empty() {
            return Ok(None);
        }

        match self.fingerprinter.image(&bytes) {
            Ok(fingerprint) => Ok(Some(ClipboardSnapshot::new(
                ClipboardKind::Image,
                bytes,
                fingerprint,
                Instant::now(),
            ))),
            Err(err) => {
                warn!(
                    phase = %Phase::Capture,
                    size_bytes = bytes.len(),
                    error = %format!("{err:#}"),
                    "Local clipboard image could not be fingerprinted"
                );
                Ok(None)
            }
        }
    }

    /// Blank text carries nothing worth syncing and yields `None`.
    pub fn text_snapshot(&self, text: String, captured_at: Instant) -> Option<ClipboardSnapshot> {
        if text.trim().is_empty() {
            return None;
        }
        let fingerprint = self.fingerprinter.text(&text);
        Some(ClipboardSnapshot::new(
            ClipboardKind::Text,
            text.into_bytes(),
            fingerprint,
            captured_at,
        ))
    }
}
