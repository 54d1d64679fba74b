//! # cl-core
//!
//! Core domain models and ports for cliplink.
//!
//! This crate contains pure synchronization logic without any infrastructure
//! dependencies: the data model shared by the engine and the monitors, the
//! detection rule table, the companion app protocol, and the port traits
//! implemented by `cl-platform` and `cl-infra`.

pub mod clipboard;
pub mod companion;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod ids;
pub mod monitor;
pub mod notification;
pub mod ports;

pub use clipboard::{ClipboardKind, ClipboardSnapshot, Fingerprint, FingerprintAlgorithm};
pub use config::SyncConfig;
pub use endpoint::Endpoint;
pub use error::{Phase, SyncError};
pub use ids::EndpointId;
pub use notification::ChangeNotification;
