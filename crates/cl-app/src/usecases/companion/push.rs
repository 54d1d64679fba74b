use anyhow::Context;
use cl_core::companion::{encode_image_artifact, sniff_image_format};
use cl_core::{Endpoint, Phase, SyncError};
use tracing::{debug, info_span, Instrument};

use super::CompanionClient;

impl CompanionClient {
    /// Put `text` on the device clipboard.
    pub async fn push_text(&self, endpoint: &Endpoint, text: &str) -> Result<(), SyncError> {
        let span = info_span!("usecase.push_text", endpoint = %endpoint.id);

        async move {
            let output = self
                .shell(endpoint, &self.commands.write_text(text))
                .await
                .map_err(|err| SyncError::transient(endpoint.id.clone(), Phase::Push, err))?;
            Self::check_accepted("am broadcast", &output)
                .map_err(|err| SyncError::transient(endpoint.id.clone(), Phase::Push, err.into()))?;
            debug!(size_bytes = text.len(), "Text pushed");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Put an encoded image on the device clipboard.
    ///
    /// The image travels as an artifact file pushed next to the companion,
    /// since broadcast extras are too small for image data.
    pub async fn push_image(&self, endpoint: &Endpoint, bytes: &[u8]) -> Result<(), SyncError> {
        let span = info_span!("usecase.push_image", endpoint = %endpoint.id);

        async move {
            let transient = |err: anyhow::Error| SyncError::transient(endpoint.id.clone(), Phase::Push, err);

            let (mime, ext) = sniff_image_format(bytes);
            let artifact = encode_image_artifact(mime, &format!("clipboard.{ext}"), bytes);
            let local_path = self.scratch_path(endpoint, "outgoing_image.txt");
            tokio::fs::write(&local_path, artifact.as_bytes())
                .await
                .with_context(|| format!("write {}", local_path.display()))
                .map_err(transient)?;

            let pushed = self
                .transport
                .push_file(&endpoint.handle, &local_path, self.commands.image_push_path())
                .await
                .context("push image artifact");
            let _ = tokio::fs::remove_file(&local_path).await;
            pushed.map_err(transient)?;

            let output = self
                .shell(endpoint, &self.commands.write_image_file())
                .await
                .map_err(transient)?;
            Self::check_accepted("am broadcast", &output).map_err(|err| transient(err.into()))?;
            debug!(mime, size_bytes = bytes.len(), "Image pushed");
            Ok(())
        }
        .instrument(span)
        .await
    }
}
