//! Protocol spoken with the companion app on the remote device.
//!
//! The app exposes three surfaces:
//!
//! - a `WriteReceiver` broadcast receiver that puts text, or an image read
//!   from a file, onto the device clipboard
//! - a transparent `MainActivity` that dumps the current clipboard into its
//!   external files dir, as `clipboard_content.txt` or `clipboard_image.txt`
//! - an accessibility service logging `ClipboardMonitor: Clipboard changed`
//!   whenever the device clipboard changes
//!
//! This module only builds commands and encodes/decodes artifacts. Running
//! them is the transport's job.

mod artifact;
mod commands;

pub use artifact::{
    decode_image_artifact, encode_image_artifact, sniff_image_format, ArtifactError, ImageArtifact,
};
pub use commands::{shell_quote, CompanionCommands, RemoteArtifactKind};

pub const DEFAULT_PACKAGE: &str = "com.example.clipboard";
pub const DEFAULT_FILES_DIR: &str = "/sdcard/Android/data/com.example.clipboard/files";
pub const DEFAULT_IMAGE_PUSH_PATH: &str = "/data/local/tmp/cliplink_image.txt";

pub const TEXT_ARTIFACT_NAME: &str = "clipboard_content.txt";
pub const IMAGE_ARTIFACT_NAME: &str = "clipboard_image.txt";
