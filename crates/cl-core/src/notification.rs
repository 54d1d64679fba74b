use tokio::time::Instant;

use crate::EndpointId;

/// "Something was copied on this endpoint."
///
/// Carries no payload: the engine captures the remote clipboard itself once
/// the notification survives suppression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub endpoint: EndpointId,
    pub observed_at: Instant,
    /// Name of the detection rule that fired.
    pub rule: String,
}

impl ChangeNotification {
    pub fn new(endpoint: EndpointId, observed_at: Instant, rule: impl Into<String>) -> Self {
        Self {
            endpoint,
            observed_at,
            rule: rule.into(),
        }
    }
}
