//! In-memory doubles shared by the cl-app integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use cl_core::companion::{
    decode_image_artifact, encode_image_artifact, CompanionCommands, RemoteArtifactKind,
};
use cl_core::config::CompanionConfig;
use cl_core::monitor::DetectionRules;
use cl_core::ports::{CommandOutput, EventLines, LocalClipboardPort, RemoteTransportPort};
use cl_infra::Blake3Fingerprinter;
use futures::StreamExt;
use image::{ImageFormat, Rgba, RgbaImage};
use tokio::sync::mpsc;

use cl_app::EngineDeps;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clip {
    Text(String),
    Image(Vec<u8>),
}

/// How the companion activity reacts to a dump request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMode {
    Immediate,
    /// Activity starts but never writes anything.
    Never,
    /// Writes the dump, but pulling it never completes.
    HangOnPull,
    /// Writes an image dump whose payload is not an image.
    CorruptImage,
}

pub struct FakeDevice {
    pub serial: Option<String>,
    pub clipboard: Option<Clip>,
    pub dump_mode: DumpMode,
    pub fail_writes: bool,
    pub files: HashMap<String, Vec<u8>>,
    pub received: Vec<Clip>,
    pub commands: Vec<String>,
    events: Option<mpsc::UnboundedSender<String>>,
}

impl FakeDevice {
    fn new(serial: Option<&str>) -> Self {
        Self {
            serial: serial.map(str::to_string),
            clipboard: None,
            dump_mode: DumpMode::Immediate,
            fail_writes: false,
            files: HashMap::new(),
            received: Vec::new(),
            commands: Vec::new(),
            events: None,
        }
    }
}

/// A transport whose devices all run the companion app.
pub struct FakeTransport {
    commands: CompanionCommands,
    listing: Mutex<Option<Vec<String>>>,
    devices: Mutex<BTreeMap<String, FakeDevice>>,
    pub list_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            commands: CompanionCommands::new(&CompanionConfig::default()),
            listing: Mutex::new(Some(Vec::new())),
            devices: Mutex::new(BTreeMap::new()),
            list_calls: AtomicUsize::new(0),
        })
    }

    /// Attach a device whose serial equals its handle.
    pub fn attach(&self, handle: &str) {
        self.attach_with_serial(handle, Some(handle));
    }

    pub fn attach_with_serial(&self, handle: &str, serial: Option<&str>) {
        self.devices
            .lock()
            .unwrap()
            .insert(handle.to_string(), FakeDevice::new(serial));
        let mut listing = self.listing.lock().unwrap();
        let listing = listing.get_or_insert_with(Vec::new);
        if !listing.iter().any(|h| h == handle) {
            listing.push(handle.to_string());
        }
    }

    /// Stop listing `handle`; the device state is kept.
    pub fn detach(&self, handle: &str) {
        if let Some(listing) = self.listing.lock().unwrap().as_mut() {
            listing.retain(|h| h != handle);
        }
    }

    pub fn fail_listing(&self) {
        *self.listing.lock().unwrap() = None;
    }

    pub fn with_device<R>(&self, handle: &str, f: impl FnOnce(&mut FakeDevice) -> R) -> R {
        let mut devices = self.devices.lock().unwrap();
        f(devices.get_mut(handle).expect("unknown fake device"))
    }

    pub fn received(&self, handle: &str) -> Vec<Clip> {
        self.with_device(handle, |d| d.received.clone())
    }

    pub fn dump_requests(&self, handle: &str) -> usize {
        self.with_device(handle, |d| {
            d.commands.iter().filter(|c| c.starts_with("am start")).count()
        })
    }

    pub fn has_event_stream(&self, handle: &str) -> bool {
        self.with_device(handle, |d| d.events.as_ref().is_some_and(|tx| !tx.is_closed()))
    }

    /// Emit one line on the device's event stream.
    pub fn emit(&self, handle: &str, line: &str) -> bool {
        self.with_device(handle, |d| {
            d.events
                .as_ref()
                .is_some_and(|tx| tx.send(line.to_string()).is_ok())
        })
    }

    fn run_command(&self, device: &mut FakeDevice, command: &str) -> CommandOutput {
        device.commands.push(command.to_string());
        let text_path = self.commands.artifact_path(RemoteArtifactKind::Text);
        let image_path = self.commands.artifact_path(RemoteArtifactKind::Image);

        if command.starts_with("rm -f") {
            device.files.remove(&text_path);
            device.files.remove(&image_path);
            return CommandOutput::success("");
        }

        if command.starts_with("am start") {
            match (device.dump_mode, device.clipboard.clone()) {
                (DumpMode::Never, _) | (_, None) => {}
                (DumpMode::CorruptImage, _) => {
                    device
                        .files
                        .insert(image_path, b"image/png\nclip.png\nbm90IGFuIGltYWdl".to_vec());
                }
                (_, Some(Clip::Text(text))) => {
                    device.files.insert(text_path, text.into_bytes());
                }
                (_, Some(Clip::Image(bytes))) => {
                    let artifact = encode_image_artifact("image/png", "clip.png", &bytes);
                    device.files.insert(image_path, artifact.into_bytes());
                }
            }
            return CommandOutput::success("Starting: Intent { cmp=... }");
        }

        if command.starts_with("ls ") {
            let listing: Vec<&str> = [&image_path, &text_path]
                .into_iter()
                .filter(|path| device.files.contains_key(*path))
                .map(String::as_str)
                .collect();
            return CommandOutput {
                status: Some(if listing.is_empty() { 1 } else { 0 }),
                stdout: listing.join("\n"),
                stderr: String::new(),
            };
        }

        if command.contains(".WRITE") {
            if device.fail_writes {
                return CommandOutput {
                    status: Some(0),
                    stdout: String::new(),
                    stderr: "Error: Broadcast rejected".into(),
                };
            }
            if let Some(quoted) = command.split(" -e text ").nth(1) {
                let clip = Clip::Text(unquote(quoted));
                device.clipboard = Some(clip.clone());
                device.received.push(clip);
            } else if command.contains(" -e image_file ") {
                let raw = device
                    .files
                    .get(self.commands.image_push_path())
                    .cloned()
                    .unwrap_or_default();
                match decode_image_artifact(&raw) {
                    Ok(artifact) => {
                        let clip = Clip::Image(artifact.bytes);
                        device.clipboard = Some(clip.clone());
                        device.received.push(clip);
                    }
                    Err(err) => {
                        return CommandOutput {
                            status: Some(0),
                            stdout: String::new(),
                            stderr: format!("Error: {err}"),
                        }
                    }
                }
            }
            return CommandOutput::success("Broadcast completed: result=0");
        }

        CommandOutput {
            status: Some(127),
            stdout: String::new(),
            stderr: format!("unknown command: {command}"),
        }
    }
}

/// Reverse of `shell_quote` for the single-quoted form.
fn unquote(quoted: &str) -> String {
    match quoted.strip_prefix('\'').and_then(|q| q.strip_suffix('\'')) {
        Some(inner) => inner.replace(r"'\''", "'"),
        None => quoted.to_string(),
    }
}

#[async_trait]
impl RemoteTransportPort for FakeTransport {
    async fn list_endpoints(&self) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listing
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("cannot connect to daemon"))
    }

    async fn canonical_identity(&self, handle: &str) -> Result<Option<String>> {
        let devices = self.devices.lock().unwrap();
        let device = devices.get(handle).ok_or_else(|| anyhow!("device not found"))?;
        Ok(device.serial.clone())
    }

    async fn execute(&self, handle: &str, command: &str) -> Result<CommandOutput> {
        let mut devices = self.devices.lock().unwrap();
        let device = devices
            .get_mut(handle)
            .ok_or_else(|| anyhow!("device '{handle}' not found"))?;
        Ok(self.run_command(device, command))
    }

    async fn push_file(&self, handle: &str, local_path: &Path, remote_path: &str) -> Result<()> {
        let bytes = std::fs::read(local_path)?;
        self.with_device(handle, |d| {
            d.files.insert(remote_path.to_string(), bytes);
        });
        Ok(())
    }

    async fn pull_file(&self, handle: &str, remote_path: &str, _local: &Path) -> Result<Vec<u8>> {
        let (mode, bytes) = self.with_device(handle, |d| (d.dump_mode, d.files.get(remote_path).cloned()));
        if mode == DumpMode::HangOnPull {
            futures::future::pending::<()>().await;
        }
        bytes.ok_or_else(|| anyhow!("remote object '{remote_path}' does not exist"))
    }

    async fn open_event_stream(&self, handle: &str) -> Result<EventLines> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.with_device(handle, |d| d.events = Some(tx));
        let lines = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|line| (Ok(line), rx))
        });
        Ok(lines.boxed())
    }
}

/// Local clipboard with call counters and an "unavailable" switch.
///
/// Holds one item like a real clipboard: copying or writing text drops the
/// image and the other way round. `copy_image_with_text` models a file
/// manager copy that offers both.
#[derive(Default)]
pub struct FakeClipboard {
    pub text: Mutex<Option<String>>,
    pub image: Mutex<Option<Vec<u8>>>,
    pub unavailable: AtomicBool,
    pub text_writes: AtomicUsize,
    pub image_writes: AtomicUsize,
}

impl FakeClipboard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn copy_text(&self, text: &str) {
        *self.text.lock().unwrap() = Some(text.to_string());
        *self.image.lock().unwrap() = None;
    }

    pub fn copy_image(&self, bytes: Vec<u8>) {
        *self.image.lock().unwrap() = Some(bytes);
        *self.text.lock().unwrap() = None;
    }

    pub fn copy_image_with_text(&self, bytes: Vec<u8>, text: &str) {
        *self.image.lock().unwrap() = Some(bytes);
        *self.text.lock().unwrap() = Some(text.to_string());
    }

    pub fn current_text(&self) -> Option<String> {
        self.text.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        self.text_writes.load(Ordering::SeqCst) + self.image_writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("clipboard backend unavailable"));
        }
        Ok(())
    }
}

impl LocalClipboardPort for FakeClipboard {
    fn get_text(&self) -> Result<Option<String>> {
        self.check()?;
        Ok(self.text.lock().unwrap().clone())
    }

    fn set_text(&self, text: &str) -> Result<()> {
        self.check()?;
        self.text_writes.fetch_add(1, Ordering::SeqCst);
        self.copy_text(text);
        Ok(())
    }

    fn get_image(&self) -> Result<Option<Vec<u8>>> {
        self.check()?;
        Ok(self.image.lock().unwrap().clone())
    }

    fn set_image(&self, bytes: &[u8]) -> Result<()> {
        self.check()?;
        self.image_writes.fetch_add(1, Ordering::SeqCst);
        self.copy_image(bytes.to_vec());
        Ok(())
    }
}

/// Route engine logs to the test harness. `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn deps(transport: Arc<FakeTransport>, clipboard: Arc<FakeClipboard>) -> EngineDeps {
    EngineDeps {
        transport,
        clipboard,
        fingerprinter: Arc::new(Blake3Fingerprinter),
        rules: DetectionRules::builtin(),
    }
}

/// Solid-colour PNG.
pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}
