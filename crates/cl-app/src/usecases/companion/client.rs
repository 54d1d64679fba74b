use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cl_core::companion::CompanionCommands;
use cl_core::config::CompanionConfig;
use cl_core::ports::{CommandOutput, FingerprintPort, RemoteTransportPort};
use cl_core::Endpoint;

use super::CompanionError;

/// Reads and writes a remote clipboard by driving the companion app over
/// the transport.
pub struct CompanionClient {
    pub(super) transport: Arc<dyn RemoteTransportPort>,
    pub(super) fingerprinter: Arc<dyn FingerprintPort>,
    pub(super) commands: CompanionCommands,
    work_dir: PathBuf,
    pub(super) poll_interval: Duration,
    pub(super) artifact_wait: Duration,
}

impl CompanionClient {
    /// `artifact_wait` bounds how long a capture polls for the dump before
    /// giving up with "no data".
    pub fn new(
        transport: Arc<dyn RemoteTransportPort>,
        fingerprinter: Arc<dyn FingerprintPort>,
        config: &CompanionConfig,
        work_dir: impl Into<PathBuf>,
        poll_interval: Duration,
        artifact_wait: Duration,
    ) -> Self {
        Self {
            transport,
            fingerprinter,
            commands: CompanionCommands::new(config),
            work_dir: work_dir.into(),
            poll_interval,
            artifact_wait,
        }
    }

    /// Scratch file for one endpoint. Endpoint ids may carry `:` (network
    /// handles), which is not welcome in file names everywhere.
    pub(super) fn scratch_path(&self, endpoint: &Endpoint, name: &str) -> PathBuf {
        let safe: String = endpoint
            .id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.work_dir.join(format!("{safe}-{name}"))
    }

    pub(super) async fn shell(&self, endpoint: &Endpoint, command: &str) -> Result<CommandOutput> {
        self.transport
            .execute(&endpoint.handle, command)
            .await
            .with_context(|| format!("run companion command on {}", endpoint.id))
    }

    /// `am` reports most failures on stderr with a zero exit status.
    pub(super) fn check_accepted(
        command: &'static str,
        output: &CommandOutput,
    ) -> Result<(), CompanionError> {
        let rejected = !output.is_success()
            || output.stderr.contains("Error")
            || output.stderr.contains("inaccessible");
        if rejected {
            return Err(CompanionError::Rejected {
                command,
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}
