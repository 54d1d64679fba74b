//! Process startup: configuration, logging and wiring of the adapters into
//! the engine.

pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, resolve_config, CliOverrides, ConfigError};
pub use run::run;
pub use wiring::build_engine;
