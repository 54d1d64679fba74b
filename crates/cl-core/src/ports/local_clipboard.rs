//! Clipboard port - abstracts local clipboard access

use anyhow::Result;

/// Local clipboard port
///
/// Text and image are separate channels. `Ok(None)` means the clipboard holds
/// nothing of that kind; `Err` means the clipboard could not be reached.
/// Image bytes are an encoded image file (PNG when read back from the system).
pub trait LocalClipboardPort: Send + Sync {
    fn get_text(&self) -> Result<Option<String>>;

    fn set_text(&self, text: &str) -> Result<()>;

    fn get_image(&self) -> Result<Option<Vec<u8>>>;

    fn set_image(&self, bytes: &[u8]) -> Result<()>;
}
