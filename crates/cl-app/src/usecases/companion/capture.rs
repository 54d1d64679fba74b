use anyhow::Context;
use cl_core::companion::{decode_image_artifact, RemoteArtifactKind};
use cl_core::{ClipboardKind, ClipboardSnapshot, Endpoint, Phase, SyncError};
use tokio::time::Instant;
use tracing::{debug, info_span, Instrument};

use super::{CompanionClient, CompanionError};

impl CompanionClient {
    /// Ask the companion app to dump the device clipboard and read it back.
    ///
    /// `Ok(None)` when no dump shows up within the artifact wait or the dump
    /// holds nothing usable.
    pub async fn capture_remote(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Option<ClipboardSnapshot>, SyncError> {
        let span = info_span!("usecase.remote_capture", endpoint = %endpoint.id);

        async move {
            let transient = |err: anyhow::Error| SyncError::transient(endpoint.id.clone(), Phase::Capture, err);

            // Stale dumps would otherwise be mistaken for a fresh one.
            self.shell(endpoint, &self.commands.clear_artifacts())
                .await
                .map_err(transient)?;

            let started = self
                .shell(endpoint, &self.commands.request_dump())
                .await
                .map_err(transient)?;
            Self::check_accepted("am start", &started)
                .map_err(|err| transient(err.into()))?;

            let Some(kind) = self.wait_for_artifact(endpoint).await.map_err(transient)? else {
                debug!("No clipboard dump appeared");
                return Ok(None);
            };

            let remote_path = self.commands.artifact_path(kind);
            let local_path = self.scratch_path(endpoint, kind.file_name());
            let raw = self
                .transport
                .pull_file(&endpoint.handle, &remote_path, &local_path)
                .await
                .with_context(|| format!("pull {remote_path}"))
                .map_err(transient)?;
            // Best effort: the next capture overwrites it anyway.
            let _ = tokio::fs::remove_file(&local_path).await;

            self.decode(endpoint, kind, raw)
        }
        .instrument(span)
        .await
    }

    async fn wait_for_artifact(
        &self,
        endpoint: &Endpoint,
    ) -> anyhow::Result<Option<RemoteArtifactKind>> {
        let deadline = Instant::now() + self.artifact_wait;
        loop {
            let listing = self.shell(endpoint, &self.commands.list_artifacts()).await?;
            if let Some(kind) = self.commands.parse_listing(&listing.stdout) {
                return Ok(Some(kind));
            }
            if Instant::now() + self.poll_interval >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn decode(
        &self,
        endpoint: &Endpoint,
        kind: RemoteArtifactKind,
        raw: Vec<u8>,
    ) -> Result<Option<ClipboardSnapshot>, SyncError> {
        let now = Instant::now();
        match kind {
            RemoteArtifactKind::Text => {
                let text = String::from_utf8(raw)
                    .map_err(|_| SyncError::corrupt(endpoint.id.clone(), "text dump is not valid UTF-8"))?;
                if text.trim().is_empty() {
                    return Ok(None);
                }
                let fingerprint = self.fingerprinter.text(&text);
                debug!(fingerprint = %fingerprint.short(), size_bytes = text.len(), "Remote text captured");
                Ok(Some(ClipboardSnapshot::new(
                    ClipboardKind::Text,
                    text.into_bytes(),
                    fingerprint,
                    now,
                )))
            }
            RemoteArtifactKind::Image => {
                let artifact = decode_image_artifact(&raw).map_err(|err| {
                    SyncError::corrupt(endpoint.id.clone(), CompanionError::from(err).to_string())
                })?;
                let fingerprint = self.fingerprinter.image(&artifact.bytes).map_err(|err| {
                    SyncError::corrupt(endpoint.id.clone(), format!("undecodable image: {err:#}"))
                })?;
                debug!(
                    fingerprint = %fingerprint.short(),
                    mime = %artifact.mime,
                    filename = %artifact.filename,
                    size_bytes = artifact.bytes.len(),
                    "Remote image captured"
                );
                Ok(Some(ClipboardSnapshot::new(
                    ClipboardKind::Image,
                    artifact.bytes,
                    fingerprint,
                    now,
                )))
            }
        }
    }
}
