/// What one engine tick did. Counts only; details go to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Endpoints in the current set after discovery.
    pub endpoints: usize,
    pub monitors_started: usize,
    pub pushed: usize,
    pub push_failures: usize,
    pub retried: usize,
    pub skipped_filename: usize,
    pub suppressed_echo: usize,
    pub debounced: usize,
    pub capture_failures: usize,
    pub unchanged_inbound: usize,
    pub applied: usize,
}

impl TickReport {
    /// Nothing happened apart from discovery.
    pub fn is_idle(&self) -> bool {
        self.monitors_started == 0
            && self.pushed == 0
            && self.push_failures == 0
            && self.retried == 0
            && self.skipped_filename == 0
            && self.suppressed_echo == 0
            && self.debounced == 0
            && self.capture_failures == 0
            && self.unchanged_inbound == 0
            && self.applied == 0
    }
}
