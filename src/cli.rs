use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keep the desktop clipboard in sync with adb-attached Android devices.
#[derive(Debug, Parser)]
#[command(name = "cliplink", version, about)]
pub struct Cli {
    /// Config file. Defaults to `<config dir>/cliplink/config.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// adb binary to run instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    pub adb: Option<PathBuf>,

    /// Engine tick in milliseconds.
    #[arg(long, global = true, value_name = "N")]
    pub tick_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the sync loop until interrupted (default).
    Run,
    /// List reachable devices, one line per identity.
    Devices,
    /// Print the detection rules in effect.
    Rules,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}
