use std::fmt::{Display, Formatter};

use tokio::time::Instant;

use super::Fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardKind {
    Text,
    Image,
}

impl Display for ClipboardKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardKind::Text => write!(f, "text"),
            ClipboardKind::Image => write!(f, "image"),
        }
    }
}

/// One sampled clipboard value, local or remote.
///
/// Fields are private so a snapshot cannot drift from its fingerprint after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    kind: ClipboardKind,
    payload: Vec<u8>,
    fingerprint: Fingerprint,
    captured_at: Instant,
}

impl ClipboardSnapshot {
    pub fn new(
        kind: ClipboardKind,
        payload: Vec<u8>,
        fingerprint: Fingerprint,
        captured_at: Instant,
    ) -> Self {
        Self {
            kind,
            payload,
            fingerprint,
            captured_at,
        }
    }

    pub fn kind(&self) -> ClipboardKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }

    /// Text payload as UTF-8, `None` for images.
    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            ClipboardKind::Text => std::str::from_utf8(&self.payload).ok(),
            ClipboardKind::Image => None,
        }
    }
}

/// Local clipboard sampled on one channel each.
///
/// Text and image are tracked independently and never merged into one
/// fingerprint.
#[derive(Debug, Clone, Default)]
pub struct LocalSnapshots {
    pub text: Option<ClipboardSnapshot>,
    pub image: Option<ClipboardSnapshot>,
}
