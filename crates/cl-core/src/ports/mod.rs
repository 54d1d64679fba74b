//! Port interfaces for the application layer
//!
//! Ports define the contract between the synchronization logic in `cl-app`
//! and the adapters in `cl-platform` / `cl-infra`, so the engine can run
//! against in-memory doubles in tests.

mod fingerprint;
mod local_clipboard;
mod remote_transport;

pub use fingerprint::FingerprintPort;
pub use local_clipboard::LocalClipboardPort;
pub use remote_transport::{CommandOutput, EventLines, RemoteTransportPort};
