mod common;

use std::sync::Arc;
use std::time::Duration;

use cl_app::CompanionClient;
use cl_core::companion::CompanionCommands;
use cl_core::config::CompanionConfig;
use cl_core::{ClipboardKind, Endpoint, EndpointId, Phase, SyncError};
use cl_infra::Blake3Fingerprinter;
use common::{png, Clip, DumpMode, FakeTransport};
use tempfile::TempDir;
use tokio::time::Instant;

fn client(transport: Arc<FakeTransport>, work_dir: &TempDir) -> CompanionClient {
    CompanionClient::new(
        transport,
        Arc::new(Blake3Fingerprinter),
        &CompanionConfig::default(),
        work_dir.path(),
        Duration::from_millis(250),
        Duration::from_secs(5),
    )
}

fn endpoint(handle: &str) -> Endpoint {
    Endpoint::new(EndpointId::new(handle), handle, Instant::now())
}

#[tokio::test(start_paused = true)]
async fn capture_clears_requests_then_lists() {
    let transport = FakeTransport::new();
    transport.attach("X");
    transport.with_device("X", |d| d.clipboard = Some(Clip::Text("hi".into())));
    let dir = TempDir::new().unwrap();

    let snapshot = client(transport.clone(), &dir)
        .capture_remote(&endpoint("X"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.kind(), ClipboardKind::Text);
    assert_eq!(snapshot.as_text(), Some("hi"));

    let commands = CompanionCommands::new(&CompanionConfig::default());
    let issued = transport.with_device("X", |d| d.commands.clone());
    assert_eq!(
        issued,
        vec![
            commands.clear_artifacts(),
            commands.request_dump(),
            commands.list_artifacts(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn image_dump_wins_over_text() {
    let transport = FakeTransport::new();
    transport.attach("X");
    let image = png(10, 10, [5, 5, 5, 255]);
    transport.with_device("X", |d| d.clipboard = Some(Clip::Image(image.clone())));
    let dir = TempDir::new().unwrap();

    let snapshot = client(transport, &dir)
        .capture_remote(&endpoint("X"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.kind(), ClipboardKind::Image);
    assert_eq!(snapshot.payload(), image.as_slice());
}

#[tokio::test(start_paused = true)]
async fn no_dump_within_wait_is_no_data() {
    let transport = FakeTransport::new();
    transport.attach("X");
    transport.with_device("X", |d| d.dump_mode = DumpMode::Never);
    let dir = TempDir::new().unwrap();

    let started = Instant::now();
    let result = client(transport, &dir).capture_remote(&endpoint("X")).await;
    assert!(matches!(result, Ok(None)));
    assert!(Instant::now() - started < Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn corrupt_image_dump_is_corrupt_payload() {
    let transport = FakeTransport::new();
    transport.attach("X");
    transport.with_device("X", |d| {
        d.clipboard = Some(Clip::Text("ignored".into()));
        d.dump_mode = DumpMode::CorruptImage;
    });
    let dir = TempDir::new().unwrap();

    let err = client(transport, &dir)
        .capture_remote(&endpoint("X"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::CorruptPayload { .. }));
    assert_eq!(err.endpoint().map(EndpointId::as_str), Some("X"));
}

#[tokio::test]
async fn rejected_broadcast_is_a_transient_push_failure() {
    let transport = FakeTransport::new();
    transport.attach("X");
    transport.with_device("X", |d| d.fail_writes = true);
    let dir = TempDir::new().unwrap();

    let err = client(transport, &dir)
        .push_text(&endpoint("X"), "hello")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::TransientEndpoint {
            phase: Phase::Push,
            ..
        }
    ));
}

#[tokio::test]
async fn image_push_travels_as_artifact_file() {
    let transport = FakeTransport::new();
    transport.attach("10.0.0.7:5555");
    let dir = TempDir::new().unwrap();
    let image = png(12, 12, [0, 128, 255, 255]);

    client(transport.clone(), &dir)
        .push_image(&endpoint("10.0.0.7:5555"), &image)
        .await
        .unwrap();

    let commands = CompanionCommands::new(&CompanionConfig::default());
    let artifact = transport.with_device("10.0.0.7:5555", |d| {
        d.files.get(commands.image_push_path()).cloned().unwrap()
    });
    assert!(artifact.starts_with(b"image/png\nclipboard.png\n"));
    assert_eq!(transport.received("10.0.0.7:5555"), vec![Clip::Image(image)]);
    // Scratch file is cleaned up.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn unknown_device_is_transient() {
    let transport = FakeTransport::new();
    let dir = TempDir::new().unwrap();
    let err = client(transport, &dir)
        .capture_remote(&endpoint("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.phase(), Phase::Capture);
}
