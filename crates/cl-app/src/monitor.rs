use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cl_core::monitor::DetectionRules;
use cl_core::ports::RemoteTransportPort;
use cl_core::{ChangeNotification, Endpoint, EndpointId, Phase};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// Why a monitor task returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    Cancelled,
    StreamEnded,
    StreamFailed,
    OpenFailed,
}

/// Watches one endpoint's event stream and turns matching lines into
/// notifications.
///
/// A monitor never restarts itself. Once it returns, the supervisor decides
/// whether the endpoint deserves a new one.
pub struct ChangeMonitor {
    endpoint: EndpointId,
    handle: String,
    transport: Arc<dyn RemoteTransportPort>,
    rules: Arc<DetectionRules>,
    queue: mpsc::Sender<ChangeNotification>,
    cancel: CancellationToken,
}

impl ChangeMonitor {
    pub fn new(
        endpoint: &Endpoint,
        transport: Arc<dyn RemoteTransportPort>,
        rules: Arc<DetectionRules>,
        queue: mpsc::Sender<ChangeNotification>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            endpoint: endpoint.id.clone(),
            handle: endpoint.handle.clone(),
            transport,
            rules,
            queue,
            cancel,
        }
    }

    pub fn spawn(self) -> JoinHandle<MonitorExit> {
        let span = info_span!(
            "monitor.run",
            endpoint = %self.endpoint,
            handle = %self.handle
        );
        tokio::spawn(self.run().instrument(span))
    }

    pub async fn run(self) -> MonitorExit {
        let mut lines = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return MonitorExit::Cancelled,
            opened = self.transport.open_event_stream(&self.handle) => match opened {
                Ok(lines) => lines,
                Err(err) => {
                    warn!(
                        endpoint = %self.endpoint,
                        phase = %Phase::Monitor,
                        error = %format!("{err:#}"),
                        "Failed to open event stream"
                    );
                    return MonitorExit::OpenFailed;
                }
            },
        };
        info!("Monitor started");

        let exit = loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break MonitorExit::Cancelled,
                next = lines.next() => next,
            };

            match next {
                None => break MonitorExit::StreamEnded,
                Some(Err(err)) => {
                    warn!(
                        endpoint = %self.endpoint,
                        phase = %Phase::Monitor,
                        error = %format!("{err:#}"),
                        "Event stream failed"
                    );
                    break MonitorExit::StreamFailed;
                }
                Some(Ok(line)) => self.on_line(&line),
            }
        };

        // Closes the stream, which for adb kills the logcat process.
        drop(lines);
        info!(exit = ?exit, "Monitor stopped");
        exit
    }

    fn on_line(&self, line: &str) {
        let Some(rule) = self.rules.match_line(line) else {
            return;
        };

        let notification = ChangeNotification::new(self.endpoint.clone(), Instant::now(), &rule.name);
        match self.queue.try_send(notification) {
            Ok(()) => debug!(rule = %rule.name, "Change detected"),
            Err(TrySendError::Full(_)) => warn!(
                endpoint = %self.endpoint,
                phase = %Phase::Monitor,
                rule = %rule.name,
                "Notification queue full, dropping change"
            ),
            // Engine gone; cancellation follows shortly.
            Err(TrySendError::Closed(_)) => debug!("Notification queue closed"),
        }
    }
}

struct RunningMonitor {
    task: JoinHandle<MonitorExit>,
    cancel: CancellationToken,
}

/// Owns one monitor task per endpoint, keyed by identity.
pub struct MonitorSupervisor {
    transport: Arc<dyn RemoteTransportPort>,
    rules: Arc<DetectionRules>,
    queue: mpsc::Sender<ChangeNotification>,
    root: CancellationToken,
    running: HashMap<EndpointId, RunningMonitor>,
}

impl MonitorSupervisor {
    pub fn new(
        transport: Arc<dyn RemoteTransportPort>,
        rules: Arc<DetectionRules>,
        queue: mpsc::Sender<ChangeNotification>,
        root: CancellationToken,
    ) -> Self {
        Self {
            transport,
            rules,
            queue,
            root,
            running: HashMap::new(),
        }
    }

    /// Start a monitor for every endpoint that has none or whose monitor has
    /// exited. Returns how many were started.
    ///
    /// Monitors of endpoints missing from `endpoints` are left alone.
    pub fn ensure(&mut self, endpoints: &[Endpoint]) -> usize {
        if self.root.is_cancelled() {
            return 0;
        }

        let mut started = 0;
        for endpoint in endpoints {
            if let Some(existing) = self.running.get(&endpoint.id) {
                if !existing.task.is_finished() {
                    continue;
                }
                debug!(endpoint = %endpoint.id, "Restarting exited monitor");
            }

            let cancel = self.root.child_token();
            let task = ChangeMonitor::new(
                endpoint,
                self.transport.clone(),
                self.rules.clone(),
                self.queue.clone(),
                cancel.clone(),
            )
            .spawn();
            self.running
                .insert(endpoint.id.clone(), RunningMonitor { task, cancel });
            started += 1;
        }
        started
    }

    pub fn is_running(&self, endpoint: &EndpointId) -> bool {
        self.running
            .get(endpoint)
            .is_some_and(|monitor| !monitor.task.is_finished())
    }

    pub fn running_len(&self) -> usize {
        self.running
            .values()
            .filter(|monitor| !monitor.task.is_finished())
            .count()
    }

    /// Cancel every monitor and wait up to `grace` for each to return.
    pub async fn shutdown(&mut self, grace: Duration) {
        self.root.cancel();
        let deadline = Instant::now() + grace;

        for (endpoint, monitor) in self.running.drain() {
            monitor.cancel.cancel();
            let mut task = monitor.task;
            match tokio::time::timeout_at(deadline, &mut task).await {
                Ok(Ok(exit)) => debug!(endpoint = %endpoint, exit = ?exit, "Monitor joined"),
                Ok(Err(err)) => warn!(
                    endpoint = %endpoint,
                    phase = %Phase::Monitor,
                    error = %err,
                    "Monitor task panicked"
                ),
                Err(_) => {
                    warn!(endpoint = %endpoint, phase = %Phase::Monitor, "Monitor did not stop in time, aborting");
                    task.abort();
                }
            }
        }
    }
}
