use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::EndpointId;

/// Where in the pipeline a failure happened. Logged as the `phase` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Discover,
    Monitor,
    Push,
    Capture,
    Apply,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Discover => "discover",
            Phase::Monitor => "monitor",
            Phase::Push => "push",
            Phase::Capture => "capture",
            Phase::Apply => "apply",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures the synchronization engine knows how to degrade around.
///
/// None of these are process-fatal. "No content of a recognized kind" is not
/// an error at all and is modelled as `Ok(None)` by the capture operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A transport call against one endpoint failed or timed out. Retried
    /// implicitly on a later tick.
    #[error("endpoint {endpoint} failed during {phase}: {source}")]
    TransientEndpoint {
        endpoint: EndpointId,
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },

    /// Received bytes could not be decoded as the declared kind.
    #[error("corrupt payload from {endpoint}: {reason}")]
    CorruptPayload { endpoint: EndpointId, reason: String },

    /// The local clipboard could not be read or written.
    #[error("local clipboard unavailable during {phase}: {source}")]
    LocalProviderUnavailable {
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    pub fn transient(endpoint: EndpointId, phase: Phase, source: anyhow::Error) -> Self {
        Self::TransientEndpoint {
            endpoint,
            phase,
            source,
        }
    }

    pub fn corrupt(endpoint: EndpointId, reason: impl Into<String>) -> Self {
        Self::CorruptPayload {
            endpoint,
            reason: reason.into(),
        }
    }

    pub fn local(phase: Phase, source: anyhow::Error) -> Self {
        Self::LocalProviderUnavailable { phase, source }
    }

    pub fn phase(&self) -> Phase {
        match self {
            SyncError::TransientEndpoint { phase, .. } => *phase,
            SyncError::CorruptPayload { .. } => Phase::Capture,
            SyncError::LocalProviderUnavailable { phase, .. } => *phase,
        }
    }

    pub fn endpoint(&self) -> Option<&EndpointId> {
        match self {
            SyncError::TransientEndpoint { endpoint, .. }
            | SyncError::CorruptPayload { endpoint, .. } => Some(endpoint),
            SyncError::LocalProviderUnavailable { .. } => None,
        }
    }
}
