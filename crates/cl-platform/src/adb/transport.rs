use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdout, Command};

use cl_core::ports::{CommandOutput, EventLines, RemoteTransportPort};

use super::devices::parse_device_list;

#[derive(Debug, thiserror::Error)]
pub enum AdbError {
    #[error("`adb {args}` exited with {status:?}: {stderr}")]
    CommandFailed {
        args: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("adb {0} pipe was not captured")]
    MissingPipe(&'static str),
    #[error("unexpected {what} output: {output:?}")]
    UnexpectedOutput { what: &'static str, output: String },
}

/// `RemoteTransportPort` over the `adb` command line tool.
///
/// Every call spawns a fresh `adb` process. The event stream is `logcat`
/// running for as long as the returned stream is alive.
#[derive(Debug, Clone)]
pub struct AdbTransport {
    binary: PathBuf,
}

impl AdbTransport {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, handle: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(handle) = handle {
            cmd.arg("-s").arg(handle);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run_checked(&self, handle: Option<&str>, args: &[&str]) -> Result<String> {
        let output = self
            .command(handle)
            .args(args)
            .output()
            .await
            .with_context(|| format!("failed to spawn {}", self.binary.display()))?;

        if !output.status.success() {
            return Err(AdbError::CommandFailed {
                args: args.join(" "),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Device clock as a logcat `-T` start time (`<epoch seconds>.000`).
    async fn device_clock(&self, handle: &str) -> Result<String> {
        let stdout = self
            .run_checked(Some(handle), &["shell", "date", "+%s"])
            .await
            .with_context(|| format!("read clock of {handle}"))?;
        let seconds = stdout.trim();
        seconds
            .parse::<u64>()
            .map_err(|_| AdbError::UnexpectedOutput {
                what: "date +%s",
                output: seconds.to_string(),
            })?;
        Ok(format!("{seconds}.000"))
    }
}

#[async_trait]
impl RemoteTransportPort for AdbTransport {
    async fn list_endpoints(&self) -> Result<Vec<String>> {
        let stdout = self
            .run_checked(None, &["devices"])
            .await
            .context("list adb devices")?;
        Ok(parse_device_list(&stdout))
    }

    async fn canonical_identity(&self, handle: &str) -> Result<Option<String>> {
        let stdout = self
            .run_checked(Some(handle), &["shell", "getprop", "ro.serialno"])
            .await
            .with_context(|| format!("read ro.serialno from {handle}"))?;
        let serial = stdout.trim();
        Ok((!serial.is_empty()).then(|| serial.to_string()))
    }

    async fn execute(&self, handle: &str, command: &str) -> Result<CommandOutput> {
        // The command goes through stdin so quoting and newlines survive intact.
        let mut child = self
            .command(Some(handle))
            .arg("shell")
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.binary.display()))?;

        let mut stdin = child.stdin.take().ok_or(AdbError::MissingPipe("stdin"))?;
        stdin
            .write_all(command.as_bytes())
            .await
            .context("write shell command to adb stdin")?;
        stdin.write_all(b"\n").await?;
        stdin.shutdown().await?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("wait for adb shell on {handle}"))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn push_file(&self, handle: &str, local_path: &Path, remote_path: &str) -> Result<()> {
        let local = local_path.to_string_lossy();
        self.run_checked(Some(handle), &["push", &local, remote_path])
            .await
            .with_context(|| format!("push {} to {handle}:{remote_path}", local_path.display()))?;
        Ok(())
    }

    async fn pull_file(&self, handle: &str, remote_path: &str, local_path: &Path) -> Result<Vec<u8>> {
        let local = local_path.to_string_lossy();
        self.run_checked(Some(handle), &["pull", remote_path, &local])
            .await
            .with_context(|| format!("pull {handle}:{remote_path}"))?;
        tokio::fs::read(local_path)
            .await
            .with_context(|| format!("read pulled file {}", local_path.display()))
    }

    async fn open_event_stream(&self, handle: &str) -> Result<EventLines> {
        // Start at the device's current time so nothing already buffered is replayed.
        let since = self.device_clock(handle).await?;
        let mut child = self
            .command(Some(handle))
            .args(["logcat", "-v", "brief", "-T", since.as_str()])
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("spawn adb logcat for {handle}"))?;

        let stdout = child.stdout.take().ok_or(AdbError::MissingPipe("stdout"))?;
        let reader: BufReader<ChildStdout> = BufReader::new(stdout);

        // The child rides along in the stream state; dropping the stream kills it.
        let lines = stream::unfold((child, reader), |(child, mut reader)| async move {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => None,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    Some((Ok(line), (child, reader)))
                }
                Err(err) => Some((
                    Err(anyhow::Error::new(err).context("read logcat line")),
                    (child, reader),
                )),
            }
        });

        Ok(lines.boxed())
    }
}
