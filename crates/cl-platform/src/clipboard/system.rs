use anyhow::{anyhow, Context, Result};
use clipboard_rs::common::RustImage;
use clipboard_rs::{Clipboard, ClipboardContext, ContentFormat, RustImageData};
use std::sync::{Arc, Mutex, MutexGuard};

use cl_core::ports::LocalClipboardPort;

fn map_clipboard_err<T>(
    result: std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>,
) -> Result<T> {
    result.map_err(|e| anyhow!(e))
}

/// Desktop clipboard backed by `clipboard-rs`.
///
/// Images are always handed out as PNG regardless of what the OS holds.
pub struct SystemClipboard {
    inner: Arc<Mutex<ClipboardContext>>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let context = map_clipboard_err(ClipboardContext::new())
            .context("ClipboardContext::new failed")?;
        Ok(Self {
            inner: Arc::new(Mutex::new(context)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ClipboardContext>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("clipboard context mutex poisoned"))
    }
}

impl LocalClipboardPort for SystemClipboard {
    fn get_text(&self) -> Result<Option<String>> {
        let ctx = self.lock()?;
        if !ctx.has(ContentFormat::Text) {
            return Ok(None);
        }
        let text = map_clipboard_err(ctx.get_text()).context("read text from clipboard")?;
        Ok(Some(text))
    }

    fn set_text(&self, text: &str) -> Result<()> {
        let ctx = self.lock()?;
        map_clipboard_err(ctx.set_text(text.to_string())).context("write text to clipboard")
    }

    fn get_image(&self) -> Result<Option<Vec<u8>>> {
        let ctx = self.lock()?;
        if !ctx.has(ContentFormat::Image) {
            return Ok(None);
        }
        let image = map_clipboard_err(ctx.get_image()).context("read image from clipboard")?;
        let png = map_clipboard_err(image.to_png()).context("encode clipboard image as png")?;
        Ok(Some(png.get_bytes().to_vec()))
    }

    fn set_image(&self, bytes: &[u8]) -> Result<()> {
        let image =
            map_clipboard_err(RustImageData::from_bytes(bytes)).context("decode image for clipboard")?;
        let ctx = self.lock()?;
        map_clipboard_err(ctx.set_image(image)).context("write image to clipboard")
    }
}
