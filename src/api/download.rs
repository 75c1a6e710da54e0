//! Saving a finished video to disk.
//!
//! The body is streamed into a temporary file created next to the
//! destination and then renamed into place, so the destination either
//! receives the complete video or is left untouched. The temporary file is
//! removed on every failure path when it is dropped.

use super::client::JobApiClient;
use reqwest::StatusCode;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FILE_NAME: &str = "generated_video.mp4";

/// Videos are far larger than API responses, so the download gets its own
/// limit instead of the client's per-request timeout.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("failed to fetch video: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to fetch video: server returned {0}")]
    Status(StatusCode),

    #[error("failed to write video: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to save video to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fetch `url` and store it at `destination`. Returns the number of bytes
/// written.
pub async fn download_video(
    client: &JobApiClient,
    url: &str,
    destination: &Path,
) -> Result<u64, DownloadError> {
    tracing::info!(url = %url, destination = %destination.display(), "Downloading video");

    let mut response = client
        .http()
        .get(url)
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status(status));
    }

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = tempfile::Builder::new()
        .prefix(".vision2video-")
        .suffix(".part")
        .tempfile_in(dir)?;

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        staging.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    staging.flush()?;

    staging
        .persist(destination)
        .map_err(|e| DownloadError::Persist {
            path: destination.to_path_buf(),
            source: e.error,
        })?;

    tracing::info!(bytes = written, destination = %destination.display(), "Video saved");
    Ok(written)
}
