//! Clipboard domain models.
mod filename;
mod fingerprint;
mod snapshot;

pub use filename::is_probable_image_filename;
pub use fingerprint::{Fingerprint, FingerprintAlgorithm};
pub use snapshot::{ClipboardKind, ClipboardSnapshot, LocalSnapshots};
