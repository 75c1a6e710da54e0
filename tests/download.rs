//! `download_video` against the mock backend and against a server that
//! hangs up halfway through the body.

mod common;

use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use common::*;
use vision2video::api::{download_video, DownloadError, JobApiClient};

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Answers one request with a `Content-Length` larger than the bytes it
/// actually sends, then closes the connection.
async fn start_truncating_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        let head = "HTTP/1.1 200 OK\r\ncontent-type: video/mp4\r\ncontent-length: 4096\r\n\r\n";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&[0u8; 100]).await.unwrap();
        socket.flush().await.unwrap();
        drop(socket);
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn saves_video_exactly_once() {
    let backend = MockBackend::new(SubmitReply::Job("unused"));
    let base_url = start_mock_server(backend.clone()).await;
    let client = JobApiClient::new(&base_url);
    let dir = tempfile::tempdir().expect("tempdir");
    let destination = dir.path().join("generated_video.mp4");

    let written = download_video(&client, &client.video_url("abc123").unwrap(), &destination)
        .await
        .expect("download succeeds");

    assert_eq!(written, VIDEO_BYTES.len() as u64);
    assert_eq!(std::fs::read(&destination).unwrap(), VIDEO_BYTES);
    assert_eq!(entries(dir.path()), vec!["generated_video.mp4".to_string()]);
    assert_eq!(
        backend
            .download_hits
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn overwrites_an_existing_destination() {
    let backend = MockBackend::new(SubmitReply::Job("unused"));
    let base_url = start_mock_server(backend).await;
    let client = JobApiClient::new(&base_url);
    let dir = tempfile::tempdir().expect("tempdir");
    let destination = dir.path().join("clip.mp4");
    std::fs::write(&destination, b"old").unwrap();

    download_video(&client, &client.video_url("abc123").unwrap(), &destination)
        .await
        .expect("download succeeds");

    assert_eq!(std::fs::read(&destination).unwrap(), VIDEO_BYTES);
}

#[tokio::test]
async fn missing_video_leaves_nothing_behind() {
    let backend = MockBackend::new(SubmitReply::Job("unused"));
    let base_url = start_mock_server(backend).await;
    let client = JobApiClient::new(&base_url);
    let dir = tempfile::tempdir().expect("tempdir");
    let destination = dir.path().join("generated_video.mp4");

    let err = download_video(&client, &client.video_url("missing-job").unwrap(), &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Status(status) if status.as_u16() == 404));
    assert!(!destination.exists());
    assert!(entries(dir.path()).is_empty());
}

#[tokio::test]
async fn truncated_body_removes_partial_file() {
    let base_url = start_truncating_server().await;
    let client = JobApiClient::new(&base_url);
    let dir = tempfile::tempdir().expect("tempdir");
    let destination = dir.path().join("generated_video.mp4");

    let err = download_video(&client, &format!("{}/outputs/cut.mp4", base_url), &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Request(_)), "{:?}", err);
    assert!(!destination.exists());
    assert!(entries(dir.path()).is_empty(), "{:?}", entries(dir.path()));
}
