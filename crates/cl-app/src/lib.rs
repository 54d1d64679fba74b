//! # cl-app
//!
//! Application layer for cliplink: endpoint discovery, change monitors,
//! snapshot capture, the companion client and the synchronization engine.
//! Everything here talks to the outside world through `cl_core::ports`.

pub mod deps;
pub mod monitor;
pub mod registry;
pub mod snapshot;
pub mod sync;
pub mod usecases;

pub use deps::EngineDeps;
pub use monitor::{ChangeMonitor, MonitorExit, MonitorSupervisor};
pub use registry::EndpointRegistry;
pub use snapshot::SnapshotCapture;
pub use sync::{EngineSettings, SyncEngine, TickReport};
pub use usecases::{CompanionClient, CompanionError};
