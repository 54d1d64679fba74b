//! Builds the production adapters and hands them to the engine.

use std::sync::Arc;

use anyhow::Context;
use cl_app::{EngineDeps, EngineSettings, SyncEngine};
use cl_core::monitor::DetectionRules;
use cl_core::SyncConfig;
use cl_infra::Blake3Fingerprinter;
use cl_platform::{AdbTransport, SystemClipboard};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::resolve_work_dir;

pub fn build_rules(config: &SyncConfig) -> DetectionRules {
    DetectionRules::builtin().with_extra(&config.monitor.extra_rules)
}

pub fn build_transport(config: &SyncConfig) -> AdbTransport {
    AdbTransport::new(config.adb.binary.clone())
}

/// Fails when the work dir cannot be created or the desktop clipboard is
/// unreachable; both are fatal at startup.
pub fn build_engine(config: &SyncConfig, shutdown: CancellationToken) -> anyhow::Result<SyncEngine> {
    let work_dir = resolve_work_dir(&config.storage);
    std::fs::create_dir_all(&work_dir)
        .with_context(|| format!("create work dir {}", work_dir.display()))?;

    let clipboard = SystemClipboard::new().context("local clipboard backend unavailable")?;
    let transport = build_transport(config);
    info!(
        adb = %transport.binary().display(),
        work_dir = %work_dir.display(),
        companion = %config.companion.package,
        "Wiring sync engine"
    );

    let deps = EngineDeps {
        transport: Arc::new(transport),
        clipboard: Arc::new(clipboard),
        fingerprinter: Arc::new(Blake3Fingerprinter),
        rules: build_rules(config),
    };

    Ok(SyncEngine::new(
        deps,
        EngineSettings::from_config(&config.sync),
        &config.companion,
        work_dir,
        shutdown,
    ))
}
