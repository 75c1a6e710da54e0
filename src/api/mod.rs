//! HTTP access to the video generation backend.

mod client;
pub mod download;
mod error;
mod types;

pub use client::JobApiClient;
pub use download::{download_video, DownloadError};
pub use error::ApiError;
pub use types::{JobStatus, StatusReport, SubmitResponse};
