//! Dependency grouping for engine construction.
//!
//! Plain parameter packing: every port is required and nothing here has
//! defaults.

use std::sync::Arc;

use cl_core::monitor::DetectionRules;
use cl_core::ports::{FingerprintPort, LocalClipboardPort, RemoteTransportPort};

pub struct EngineDeps {
    pub transport: Arc<dyn RemoteTransportPort>,
    pub clipboard: Arc<dyn LocalClipboardPort>,
    pub fingerprinter: Arc<dyn FingerprintPort>,
    pub rules: DetectionRules,
}
