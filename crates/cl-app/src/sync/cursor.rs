use std::collections::HashMap;

use cl_core::{ClipboardKind, EndpointId, Fingerprint};

/// Last values seen on each side.
///
/// `local_last_*` is what the local clipboard held the last time it was
/// pushed or written. `remote_last_known` is the last value exchanged with
/// any remote, in either direction.
#[derive(Debug, Default)]
pub struct SyncCursor {
    pub local_last_text: Option<Fingerprint>,
    pub local_last_image: Option<Fingerprint>,
    pub remote_last_known: Option<Fingerprint>,
    pending: HashMap<(EndpointId, ClipboardKind), PendingPush>,
}

/// A value that failed to reach one endpoint and is waiting for a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPush {
    pub fingerprint: Fingerprint,
    pub payload: Vec<u8>,
    pub attempts: u32,
}

impl SyncCursor {
    pub fn local_last(&self, kind: ClipboardKind) -> Option<Fingerprint> {
        match kind {
            ClipboardKind::Text => self.local_last_text,
            ClipboardKind::Image => self.local_last_image,
        }
    }

    /// Record a value written to the local clipboard. The clipboard holds
    /// one item, so the other kind is gone afterwards.
    pub fn replace_local(&mut self, kind: ClipboardKind, fingerprint: Fingerprint) {
        match kind {
            ClipboardKind::Text => {
                self.local_last_text = Some(fingerprint);
                self.local_last_image = None;
            }
            ClipboardKind::Image => {
                self.local_last_image = Some(fingerprint);
                self.local_last_text = None;
            }
        }
    }

    /// Whether an inbound value is new to both sides.
    pub fn is_new_inbound(&self, kind: ClipboardKind, fingerprint: Fingerprint) -> bool {
        self.local_last(kind) != Some(fingerprint) && self.remote_last_known != Some(fingerprint)
    }

    /// Park a failed push. A newer value of the same kind replaces the old one.
    pub fn park(
        &mut self,
        endpoint: EndpointId,
        kind: ClipboardKind,
        fingerprint: Fingerprint,
        payload: Vec<u8>,
    ) {
        let key = (endpoint, kind);
        let attempts = match self.pending.get(&key) {
            Some(prev) if prev.fingerprint == fingerprint => prev.attempts + 1,
            _ => 1,
        };
        self.pending.insert(
            key,
            PendingPush {
                fingerprint,
                payload,
                attempts,
            },
        );
    }

    /// Remove and return every parked push, images first.
    pub fn take_pending(&mut self) -> Vec<(EndpointId, ClipboardKind, PendingPush)> {
        let mut all: Vec<_> = self
            .pending
            .drain()
            .map(|((endpoint, kind), push)| (endpoint, kind, push))
            .collect();
        all.sort_by_key(|(endpoint, kind, _)| (*kind == ClipboardKind::Text, endpoint.clone()));
        all
    }

    /// Forget the parked push for this endpoint and kind.
    pub fn clear_pending(&mut self, endpoint: &EndpointId, kind: ClipboardKind) {
        self.pending.remove(&(endpoint.clone(), kind));
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self, endpoint: &EndpointId, kind: ClipboardKind) -> bool {
        self.pending.contains_key(&(endpoint.clone(), kind))
    }
}
