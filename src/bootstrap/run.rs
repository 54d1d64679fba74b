use anyhow::Context;
use cl_app::EndpointRegistry;
use cl_core::SyncConfig;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::{resolve_config, CliOverrides};
use super::tracing::init_tracing_subscriber;
use super::wiring::{build_engine, build_rules, build_transport};
use crate::cli::{Cli, Command};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing_subscriber()?;

    let mut config = resolve_config(cli.config.as_deref()).context("load configuration")?;
    CliOverrides::from(&cli).apply(&mut config);

    match cli.command() {
        Command::Run => run_sync(config).await,
        Command::Devices => list_devices(&config).await,
        Command::Rules => {
            print_rules(&config);
            Ok(())
        }
    }
}

async fn run_sync(config: SyncConfig) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let engine = build_engine(&config, shutdown.clone())?;
    let mut engine_task = tokio::spawn(engine.run());

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("listen for ctrl-c")?;
            info!("Shutdown requested");
            shutdown.cancel();
            (&mut engine_task).await.context("sync engine task failed")?;
        }
        joined = &mut engine_task => {
            joined.context("sync engine task failed")?;
        }
    }
    Ok(())
}

async fn list_devices(config: &SyncConfig) -> anyhow::Result<()> {
    let mut registry = EndpointRegistry::new(Arc::new(build_transport(config)));
    let endpoints = registry
        .discover(Instant::now())
        .await
        .context("list adb devices")?;

    if endpoints.is_empty() {
        println!("no devices");
        return Ok(());
    }
    for endpoint in endpoints {
        let note = if endpoint.is_identity_fallback() {
            "  (no serial, keyed by handle)"
        } else {
            ""
        };
        println!("{}\t{}{}", endpoint.id, endpoint.handle, note);
    }
    Ok(())
}

fn print_rules(config: &SyncConfig) {
    for rule in build_rules(config).iter() {
        println!("{:<28} {:<10} {}", rule.name, rule.source.to_string(), rule.patterns.join(" + "));
    }
}
