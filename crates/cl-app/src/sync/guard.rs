use std::collections::HashMap;
use std::time::Duration;

use cl_core::EndpointId;
use tokio::time::Instant;

/// Echo window plus global debounce window.
///
/// Owned by the engine task and never shared.
#[derive(Debug)]
pub struct SuppressionGuard {
    echo_window: Duration,
    global_debounce: Duration,
    sends: HashMap<EndpointId, Instant>,
    last_global_accept: Option<Instant>,
}

impl SuppressionGuard {
    pub fn new(echo_window: Duration, global_debounce: Duration) -> Self {
        Self {
            echo_window,
            global_debounce,
            sends: HashMap::new(),
            last_global_accept: None,
        }
    }

    /// Stamp the endpoint's send record. Must run before the push is awaited
    /// so that an echo arriving mid-transfer is already covered.
    pub fn record_send(&mut self, endpoint: &EndpointId, now: Instant) {
        self.sends.insert(endpoint.clone(), now);
    }

    pub fn last_send(&self, endpoint: &EndpointId) -> Option<Instant> {
        self.sends.get(endpoint).copied()
    }

    /// A notification from `endpoint` this soon after a send is presumed to be
    /// the endpoint confirming our own write.
    pub fn should_suppress(&self, endpoint: &EndpointId, now: Instant) -> bool {
        self.sends
            .get(endpoint)
            .is_some_and(|sent_at| within(now, *sent_at, self.echo_window))
    }

    pub fn should_suppress_global(&self, now: Instant) -> bool {
        self.last_global_accept
            .is_some_and(|accepted_at| within(now, accepted_at, self.global_debounce))
    }

    pub fn accept_global(&mut self, now: Instant) {
        self.last_global_accept = Some(now);
    }
}

// A `now` earlier than the stamp saturates to zero and counts as inside.
fn within(now: Instant, stamp: Instant, window: Duration) -> bool {
    now.saturating_duration_since(stamp) < window
}
