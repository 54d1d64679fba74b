use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Continuous line-oriented event stream from one endpoint.
///
/// Dropping the stream closes it and releases whatever process or socket
/// backs it.
pub type EventLines = BoxStream<'static, Result<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Remote transport port - abstracts how remote endpoints are reached.
///
/// Every method addresses an endpoint through its transient `handle`, never
/// through its canonical identity.
#[async_trait]
pub trait RemoteTransportPort: Send + Sync {
    /// Transient handles of every endpoint currently reachable.
    async fn list_endpoints(&self) -> Result<Vec<String>>;

    /// Canonical identity reported by the device behind `handle`.
    ///
    /// `Ok(None)` when the device answered without one.
    async fn canonical_identity(&self, handle: &str) -> Result<Option<String>>;

    /// Run a shell command line on the endpoint. A non-zero exit status is
    /// reported in the output, not as an error.
    async fn execute(&self, handle: &str, command: &str) -> Result<CommandOutput>;

    async fn push_file(&self, handle: &str, local_path: &Path, remote_path: &str) -> Result<()>;

    /// Copy `remote_path` to `local_path` and return its contents.
    async fn pull_file(&self, handle: &str, remote_path: &str, local_path: &Path)
        -> Result<Vec<u8>>;

    async fn open_event_stream(&self, handle: &str) -> Result<EventLines>;
}
