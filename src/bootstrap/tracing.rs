//! Tracing subscriber setup.
//!
//! - stdout layer, always
//! - daily rolling file under `<data local dir>/cliplink/logs`, when the
//!   directory can be created
//! - `RUST_LOG` replaces the default filter entirely

use std::{fs, io, path::PathBuf, sync::OnceLock};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Debug for our crates in dev builds, info in release.
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let ours = if is_dev { "debug" } else { "info" };
    vec![
        "info".to_string(),
        format!("cliplink={ours}"),
        format!("cliplink_lib={ours}"),
        format!("cl_app={ours}"),
        format!("cl_platform={ours}"),
        format!("cl_infra={ours}"),
    ]
}

pub fn logs_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("cliplink").join("logs"))
}

/// Register the global subscriber. Call once, before anything logs.
pub fn init_tracing_subscriber() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(build_filter_directives(is_development()).join(",")));

    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(BoxMakeWriter::new(io::stdout));

    let file_layer = match build_file_writer() {
        Ok(writer) => Some(
            fmt::layer()
                .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer),
        ),
        Err(err) => {
            eprintln!("File logging disabled, continuing with stdout only: {err:#}");
            None
        }
    };

    registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("tracing subscriber already registered")?;

    Ok(())
}

fn build_file_writer() -> anyhow::Result<NonBlocking> {
    let dir = logs_dir().context("no local data directory on this platform")?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&dir, "cliplink.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}
