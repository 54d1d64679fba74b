use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use cl_core::clipboard::is_probable_image_filename;
use cl_core::config::{CompanionConfig, TimingConfig};
use cl_core::ports::LocalClipboardPort;
use cl_core::{
    ChangeNotification, ClipboardKind, ClipboardSnapshot, Endpoint, EndpointId, Phase, SyncError,
};
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::{PendingPush, SuppressionGuard, SyncCursor, TickReport};
use crate::deps::EngineDeps;
use crate::monitor::MonitorSupervisor;
use crate::registry::EndpointRegistry;
use crate::snapshot::SnapshotCapture;
use crate::usecases::CompanionClient;

/// Timing knobs of the engine loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub tick: Duration,
    pub echo_window: Duration,
    pub global_debounce: Duration,
    pub capture_timeout: Duration,
    pub capture_poll: Duration,
    pub push_timeout: Duration,
    pub queue_capacity: usize,
    /// How long shutdown waits for monitors before aborting them.
    pub shutdown_grace: Duration,
}

impl EngineSettings {
    pub fn from_config(timing: &TimingConfig) -> Self {
        Self {
            tick: timing.tick(),
            echo_window: timing.echo_window(),
            global_debounce: timing.global_debounce(),
            capture_timeout: timing.capture_timeout(),
            capture_poll: timing.capture_poll(),
            push_timeout: timing.push_timeout(),
            queue_capacity: timing.queue_capacity.max(1),
            shutdown_grace: Duration::from_secs(2),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default())
    }
}

/// The synchronization loop.
///
/// Owns every piece of mutable sync state. Monitors only ever reach it
/// through the notification queue, so nothing here needs a lock.
pub struct SyncEngine {
    settings: EngineSettings,
    registry: EndpointRegistry,
    monitors: MonitorSupervisor,
    snapshots: SnapshotCapture,
    companion: CompanionClient,
    clipboard: Arc<dyn LocalClipboardPort>,
    guard: SuppressionGuard,
    cursor: SyncCursor,
    inbox: mpsc::Receiver<ChangeNotification>,
    notifier: mpsc::Sender<ChangeNotification>,
    shutdown: CancellationToken,
    ticks: u64,
}

impl SyncEngine {
    /// `work_dir` must exist; it holds scratch files for artifact transfers.
    pub fn new(
        deps: EngineDeps,
        settings: EngineSettings,
        companion: &CompanionConfig,
        work_dir: PathBuf,
        shutdown: CancellationToken,
    ) -> Self {
        let (notifier, inbox) = mpsc::channel(settings.queue_capacity.max(1));
        let rules = Arc::new(deps.rules);

        Self {
            registry: EndpointRegistry::new(deps.transport.clone()),
            monitors: MonitorSupervisor::new(
                deps.transport.clone(),
                rules,
                notifier.clone(),
                shutdown.child_token(),
            ),
            snapshots: SnapshotCapture::new(deps.clipboard.clone(), deps.fingerprinter.clone()),
            companion: CompanionClient::new(
                deps.transport,
                deps.fingerprinter,
                companion,
                work_dir,
                settings.capture_poll,
                settings.capture_timeout,
            ),
            clipboard: deps.clipboard,
            guard: SuppressionGuard::new(settings.echo_window, settings.global_debounce),
            cursor: SyncCursor::default(),
            inbox,
            notifier,
            shutdown,
            ticks: 0,
            settings,
        }
    }

    /// Producer side of the notification queue, as handed to monitors.
    pub fn notification_sender(&self) -> mpsc::Sender<ChangeNotification> {
        self.notifier.clone()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cursor(&self) -> &SyncCursor {
        &self.cursor
    }

    pub fn guard(&self) -> &SuppressionGuard {
        &self.guard
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn monitors(&self) -> &MonitorSupervisor {
        &self.monitors
    }

    /// Tick until the shutdown token fires, then stop the monitors.
    ///
    /// A tick in progress when shutdown is requested runs to completion.
    pub async fn run(mut self) {
        info!(tick_ms = self.settings.tick.as_millis() as u64, "Sync engine started");
        let mut interval = tokio::time::interval(self.settings.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            let report = self.tick().await;
            if !report.is_idle() {
                debug!(report = ?report, "Tick finished");
            }
        }

        self.monitors.shutdown(self.settings.shutdown_grace).await;
        info!(ticks = self.ticks, "Sync engine stopped");
    }

    /// One pass: discovery, outbound, retries, inbound.
    pub async fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let span = info_span!("engine.tick", tick = self.ticks);

        async {
            let mut report = TickReport::default();
            let endpoints = self.refresh_endpoints(&mut report).await;

            let due = self.cursor.take_pending();
            match self.snapshots.capture_local() {
                Ok(local) => {
                    let image_sent = self
                        .outbound_image(&endpoints, local.image, &mut report)
                        .await;
                    self.outbound_text(&endpoints, local.text, image_sent, &mut report)
                        .await;
                }
                Err(err) => log_sync_error(&err, "Local clipboard unreadable, assuming unchanged"),
            }
            self.retry_pending(due, &mut report).await;

            self.inbound(&mut report).await;
            report
        }
        .instrument(span)
        .await
    }

    async fn refresh_endpoints(&mut self, report: &mut TickReport) -> Vec<Endpoint> {
        let endpoints = match self.registry.discover(Instant::now()).await {
            Ok(endpoints) => endpoints,
            Err(err) => {
                warn!(
                    phase = %Phase::Discover,
                    error = %format!("{err:#}"),
                    "Endpoint discovery failed, keeping previous set"
                );
                self.registry.current()
            }
        };
        report.endpoints = endpoints.len();
        report.monitors_started = self.monitors.ensure(&endpoints);
        endpoints
    }

    /// Returns whether the local image changed this tick.
    async fn outbound_image(
        &mut self,
        endpoints: &[Endpoint],
        snapshot: Option<ClipboardSnapshot>,
        report: &mut TickReport,
    ) -> bool {
        let Some(snapshot) = snapshot else {
            // Once replaced, the same image copied again is a new value.
            self.cursor.local_last_image = None;
            return false;
        };

        let fingerprint = snapshot.fingerprint();
        if self.cursor.local_last_image == Some(fingerprint) {
            return false;
        }

        info!(
            fingerprint = %fingerprint.short(),
            size_bytes = snapshot.size_bytes(),
            endpoints = endpoints.len(),
            "Local image changed"
        );
        self.broadcast(endpoints, &snapshot, report).await;
        self.cursor.local_last_image = Some(fingerprint);
        true
    }

    async fn outbound_text(
        &mut self,
        endpoints: &[Endpoint],
        snapshot: Option<ClipboardSnapshot>,
        image_sent: bool,
        report: &mut TickReport,
    ) {
        let Some(snapshot) = snapshot else {
            self.cursor.local_last_text = None;
            return;
        };

        let fingerprint = snapshot.fingerprint();
        if self.cursor.local_last_text == Some(fingerprint) {
            return;
        }

        // Copying an image often also sets its file name as text. Pushing that
        // would replace the image we just sent on the remote clipboard.
        if image_sent && snapshot.as_text().is_some_and(is_probable_image_filename) {
            info!(
                text = ?snapshot.as_text(),
                "Skipping text that looks like the file name of the image just sent"
            );
            self.cursor.local_last_text = Some(fingerprint);
            report.skipped_filename += 1;
            return;
        }

        info!(
            fingerprint = %fingerprint.short(),
            size_bytes = snapshot.size_bytes(),
            endpoints = endpoints.len(),
            "Local text changed"
        );
        self.broadcast(endpoints, &snapshot, report).await;
        self.cursor.local_last_text = Some(fingerprint);
    }

    /// Push one value to every endpoint concurrently. Failures are parked
    /// per endpoint and do not affect the others.
    async fn broadcast(
        &mut self,
        endpoints: &[Endpoint],
        snapshot: &ClipboardSnapshot,
        report: &mut TickReport,
    ) {
        if endpoints.is_empty() {
            debug!(kind = %snapshot.kind(), "No endpoints to push to");
            return;
        }

        let kind = snapshot.kind();
        let fingerprint = snapshot.fingerprint();
        let now = Instant::now();
        for endpoint in endpoints {
            self.guard.record_send(&endpoint.id, now);
        }
        self.cursor.remote_last_known = Some(fingerprint);

        let results = join_all(
            endpoints
                .iter()
                .map(|endpoint| self.push_to(endpoint, kind, snapshot.payload())),
        )
        .await;

        for (endpoint, result) in endpoints.iter().zip(results) {
            match result {
                Ok(()) => {
                    report.pushed += 1;
                    self.cursor.clear_pending(&endpoint.id, kind);
                }
                Err(err) => {
                    report.push_failures += 1;
                    log_sync_error(&err, "Push failed, retrying next tick");
                    self.cursor.park(
                        endpoint.id.clone(),
                        kind,
                        fingerprint,
                        snapshot.payload().to_vec(),
                    );
                }
            }
        }
    }

    async fn retry_pending(
        &mut self,
        due: Vec<(EndpointId, ClipboardKind, PendingPush)>,
        report: &mut TickReport,
    ) {
        for (id, kind, pending) in due {
            if self.cursor.local_last(kind) != Some(pending.fingerprint) {
                debug!(endpoint = %id, kind = %kind, "Parked push superseded by a newer value");
                continue;
            }
            if !self.registry.is_present(&id) {
                info!(endpoint = %id, kind = %kind, "Dropping parked push for absent endpoint");
                continue;
            }
            let Some(endpoint) = self.registry.get(&id).cloned() else {
                continue;
            };

            self.guard.record_send(&id, Instant::now());
            match self.push_to(&endpoint, kind, &pending.payload).await {
                Ok(()) => {
                    report.retried += 1;
                    info!(endpoint = %id, kind = %kind, attempts = pending.attempts, "Parked push delivered");
                }
                Err(err) => {
                    report.push_failures += 1;
                    log_sync_error(&err, "Retry failed, retrying next tick");
                    self.cursor
                        .park(id, kind, pending.fingerprint, pending.payload);
                }
            }
        }
    }

    async fn push_to(
        &self,
        endpoint: &Endpoint,
        kind: ClipboardKind,
        payload: &[u8],
    ) -> Result<(), SyncError> {
        let push = async {
            match kind {
                ClipboardKind::Text => {
                    self.companion
                        .push_text(endpoint, &String::from_utf8_lossy(payload))
                        .await
                }
                ClipboardKind::Image => self.companion.push_image(endpoint, payload).await,
            }
        };

        match tokio::time::timeout(self.settings.push_timeout, push).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::transient(
                endpoint.id.clone(),
                Phase::Push,
                anyhow!("push timed out after {:?}", self.settings.push_timeout),
            )),
        }
    }

    async fn inbound(&mut self, report: &mut TickReport) {
        while let Ok(notification) = self.inbox.try_recv() {
            self.handle_notification(notification, report).await;
        }
    }

    async fn handle_notification(
        &mut self,
        notification: ChangeNotification,
        report: &mut TickReport,
    ) {
        let ChangeNotification {
            endpoint: id,
            observed_at,
            rule,
        } = notification;

        if self.guard.should_suppress(&id, observed_at) {
            info!(endpoint = %id, rule = %rule, "Suppressed echo of our own push");
            report.suppressed_echo += 1;
            return;
        }
        if self.guard.should_suppress_global(observed_at) {
            debug!(endpoint = %id, rule = %rule, "Debounced duplicate notification");
            report.debounced += 1;
            return;
        }

        let endpoint = match self.registry.get(&id) {
            Some(endpoint) if self.registry.is_present(&id) => endpoint.clone(),
            _ => {
                debug!(endpoint = %id, rule = %rule, "Notification from endpoint not in current set");
                return;
            }
        };

        let captured = tokio::time::timeout(
            self.settings.capture_timeout,
            self.companion.capture_remote(&endpoint),
        )
        .await;
        let snapshot = match captured {
            Ok(Ok(Some(snapshot))) => snapshot,
            Ok(Ok(None)) => {
                debug!(endpoint = %id, rule = %rule, "Remote clipboard had nothing to import");
                return;
            }
            Ok(Err(err)) => {
                report.capture_failures += 1;
                log_sync_error(&err, "Remote capture failed, notification discarded");
                return;
            }
            Err(_) => {
                report.capture_failures += 1;
                warn!(
                    endpoint = %id,
                    phase = %Phase::Capture,
                    timeout_ms = self.settings.capture_timeout.as_millis() as u64,
                    "Remote capture timed out, notification discarded"
                );
                return;
            }
        };

        let kind = snapshot.kind();
        let fingerprint = snapshot.fingerprint();
        if !self.cursor.is_new_inbound(kind, fingerprint) {
            debug!(endpoint = %id, kind = %kind, fingerprint = %fingerprint.short(), "Remote value already known");
            report.unchanged_inbound += 1;
            return;
        }

        let applied = match kind {
            ClipboardKind::Text => match snapshot.as_text() {
                Some(text) => self.clipboard.set_text(text),
                None => Err(anyhow!("text snapshot is not valid UTF-8")),
            },
            ClipboardKind::Image => self.clipboard.set_image(snapshot.payload()),
        };
        if let Err(err) = applied {
            log_sync_error(
                &SyncError::local(Phase::Apply, err),
                "Failed to apply remote value locally",
            );
            return;
        }

        self.cursor.replace_local(kind, fingerprint);
        self.cursor.remote_last_known = Some(fingerprint);
        self.guard.accept_global(observed_at);
        report.applied += 1;
        info!(
            endpoint = %id,
            rule = %rule,
            kind = %kind,
            fingerprint = %fingerprint.short(),
            size_bytes = snapshot.size_bytes(),
            latency_ms = snapshot
                .captured_at()
                .saturating_duration_since(observed_at)
                .as_millis() as u64,
            "Applied remote clipboard value"
        );
    }
}

fn log_sync_error(err: &SyncError, message: &str) {
    match err.endpoint() {
        Some(endpoint) => warn!(endpoint = %endpoint, phase = %err.phase(), error = %err, "{}", message),
        None => warn!(phase = %err.phase(), error = %err, "{}", message),
    }
}
