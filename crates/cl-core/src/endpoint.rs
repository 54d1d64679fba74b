use tokio::time::Instant;

use crate::EndpointId;

/// A remote side participating in synchronization.
///
/// `handle` is whatever the transport needs to address the device right now
/// (an adb serial or `host:port`). It may change between discovery polls
/// while `id` stays the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub id: EndpointId,
    pub handle: String,
    pub last_seen: Instant,
}

impl Endpoint {
    pub fn new(id: EndpointId, handle: impl Into<String>, last_seen: Instant) -> Self {
        Self {
            id,
            handle: handle.into(),
            last_seen,
        }
    }

    /// Whether the identity could not be resolved and the transient handle
    /// is standing in for it.
    pub fn is_identity_fallback(&self) -> bool {
        self.id.as_str() == self.handle
    }
}
