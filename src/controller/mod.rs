//! Job lifecycle: image selection, submission, status polling and download.
//!
//! [`JobController`] lives on the UI thread and owns all job state. Network
//! work is spawned onto a tokio runtime and reports back through a channel
//! that [`JobController::process_events`] drains, so every state transition
//! happens on the thread that renders it.

mod poll;
mod progress;
mod state;

pub use progress::ProgressEstimate;
pub use state::{BackendStatus, JobPhase};

use crate::api::{download_video, ApiError, DownloadError, JobApiClient, JobStatus, StatusReport};
use crate::config::ApiConfig;
use crate::upload::{AssetOrigin, UploadedAsset};
use poll::PollTask;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("no image has been uploaded")]
    NoImage,

    #[error("a job is already in progress")]
    Busy,

    #[error("{file} is not an image ({mime})")]
    NotAnImage { file: String, mime: String },

    #[error("cannot {action} while {phase}")]
    InvalidState {
        action: &'static str,
        phase: &'static str,
    },
}

/// Results of background work, applied by [`JobController::process_events`].
pub(crate) enum JobEvent {
    Submitted {
        submission: u64,
        result: Result<String, ApiError>,
    },
    Polled {
        job_id: String,
        result: Result<StatusReport, ApiError>,
    },
    Downloaded {
        destination: PathBuf,
        result: Result<u64, DownloadError>,
    },
    BackendChecked(Result<String, ApiError>),
}

/// Things the view has to tell the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerNotice {
    DownloadSaved { destination: PathBuf, bytes: u64 },
    DownloadFailed { destination: PathBuf, message: String },
}

pub struct JobController {
    config: ApiConfig,
    api: JobApiClient,
    runtime: Handle,
    events_tx: Sender<JobEvent>,
    events_rx: Receiver<JobEvent>,

    phase: JobPhase,
    asset: Option<UploadedAsset>,
    prompt: String,
    progress: ProgressEstimate,
    transient_failures: u32,
    backend: BackendStatus,

    submission: u64,
    submit_task: Option<JoinHandle<()>>,
    poll_task: Option<PollTask>,
    download_task: Option<JoinHandle<()>>,
    backend_task: Option<JoinHandle<()>>,
}

impl JobController {
    pub fn new(config: ApiConfig, runtime: Handle) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let api = JobApiClient::with_timeout(config.base_url.clone(), config.request_timeout);
        tracing::info!(
            base_url = %config.base_url,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            request_timeout_ms = config.request_timeout.as_millis() as u64,
            "Job controller ready"
        );

        Self {
            config,
            api,
            runtime,
            events_tx,
            events_rx,
            phase: JobPhase::Idle,
            asset: None,
            prompt: String::new(),
            progress: ProgressEstimate::default(),
            transient_failures: 0,
            backend: BackendStatus::Unknown,
            submission: 0,
            submit_task: None,
            poll_task: None,
            download_task: None,
            backend_task: None,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    pub fn asset(&self) -> Option<&UploadedAsset> {
        self.asset.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn progress(&self) -> ProgressEstimate {
        self.progress
    }

    pub fn video_url(&self) -> Option<&str> {
        match &self.phase {
            JobPhase::Completed { video_url, .. } => Some(video_url),
            _ => None,
        }
    }

    pub fn backend_status(&self) -> &BackendStatus {
        &self.backend
    }

    pub fn is_polling(&self) -> bool {
        self.poll_task.is_some()
    }

    pub fn is_downloading(&self) -> bool {
        self.download_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Take an image from the picker or a drop. Dropped files must be images.
    pub fn accept_image(
        &mut self,
        asset: UploadedAsset,
        origin: AssetOrigin,
    ) -> Result<(), ControllerError> {
        match self.phase {
            JobPhase::Idle | JobPhase::Ready | JobPhase::Failed { .. } => {}
            _ => {
                return Err(ControllerError::InvalidState {
                    action: "change the image",
                    phase: self.phase.label(),
                })
            }
        }

        if origin == AssetOrigin::Drop && !asset.is_image() {
            tracing::warn!(file = %asset.file_name(), mime = %asset.mime(), "Ignoring dropped non-image file");
            return Err(ControllerError::NotAnImage {
                file: asset.file_name().to_string(),
                mime: asset.mime().to_string(),
            });
        }

        tracing::info!(
            file = %asset.file_name(),
            mime = %asset.mime(),
            size = asset.size(),
            ?origin,
            "Image accepted"
        );
        self.asset = Some(asset);
        self.phase = JobPhase::Ready;
        Ok(())
    }

    /// Drop the selected image without starting a job.
    pub fn remove_image(&mut self) -> Result<(), ControllerError> {
        match self.phase {
            JobPhase::Idle | JobPhase::Ready | JobPhase::Failed { .. } => {
                self.asset = None;
                self.phase = JobPhase::Idle;
                Ok(())
            }
            _ => Err(ControllerError::InvalidState {
                action: "remove the image",
                phase: self.phase.label(),
            }),
        }
    }

    /// Send the image and prompt to the backend. Without an image nothing is
    /// sent. A failed job can be submitted again with the same image.
    pub fn submit(&mut self) -> Result<(), ControllerError> {
        let Some(asset) = self.asset.clone() else {
            tracing::debug!("Submit requested without an image");
            return Err(ControllerError::NoImage);
        };

        match self.phase {
            JobPhase::Ready | JobPhase::Failed { .. } => {}
            JobPhase::Submitting | JobPhase::Polling { .. } => return Err(ControllerError::Busy),
            _ => {
                return Err(ControllerError::InvalidState {
                    action: "submit",
                    phase: self.phase.label(),
                })
            }
        }

        self.submission += 1;
        self.progress = ProgressEstimate::default();
        self.transient_failures = 0;
        self.phase = JobPhase::Submitting;

        let submission = self.submission;
        let prompt = self.prompt.clone();
        let api = self.api.clone();
        let events = self.events_tx.clone();

        tracing::info!(file = %asset.file_name(), submission, "Starting video generation");
        self.submit_task = Some(self.runtime.spawn(async move {
            let result = api.submit(&asset, &prompt).await;
            let _ = events.send(JobEvent::Submitted { submission, result });
        }));
        Ok(())
    }

    /// Return to Idle, forgetting the image, job, video and progress. The
    /// prompt is kept. A download still in flight is cancelled and leaves
    /// nothing on disk.
    pub fn reset(&mut self) {
        tracing::info!(phase = self.phase.label(), "Resetting job state");
        self.stop_polling();
        abort_task(&mut self.submit_task);
        if self.is_downloading() {
            tracing::info!("Cancelling download in progress");
        }
        abort_task(&mut self.download_task);
        self.asset = None;
        self.progress = ProgressEstimate::default();
        self.transient_failures = 0;
        self.phase = JobPhase::Idle;
    }

    /// Save the completed video to `destination`. The outcome arrives as a
    /// [`ControllerNotice`] from [`process_events`](Self::process_events).
    pub fn download(&mut self, destination: PathBuf) -> Result<(), ControllerError> {
        let Some(url) = self.video_url().map(str::to_string) else {
            return Err(ControllerError::InvalidState {
                action: "download",
                phase: self.phase.label(),
            });
        };
        if self.is_downloading() {
            return Err(ControllerError::Busy);
        }

        let api = self.api.clone();
        let events = self.events_tx.clone();
        self.download_task = Some(self.runtime.spawn(async move {
            let result = download_video(&api, &url, &destination).await;
            let _ = events.send(JobEvent::Downloaded {
                destination,
                result,
            });
        }));
        Ok(())
    }

    /// Probe the backend root so the view can show whether it is reachable.
    pub fn check_backend(&mut self) {
        self.backend = BackendStatus::Unknown;
        abort_task(&mut self.backend_task);
        let api = self.api.clone();
        let events = self.events_tx.clone();
        self.backend_task = Some(self.runtime.spawn(async move {
            let result = api.welcome().await;
            let _ = events.send(JobEvent::BackendChecked(result));
        }));
    }

    /// Apply every result that background tasks have reported so far.
    pub fn process_events(&mut self) -> Vec<ControllerNotice> {
        let mut notices = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                JobEvent::Submitted { submission, result } => {
                    self.apply_submission(submission, result)
                }
                JobEvent::Polled { job_id, result } => self.apply_poll(job_id, result),
                JobEvent::Downloaded {
                    destination,
                    result,
                } => notices.push(self.apply_download(destination, result)),
                JobEvent::BackendChecked(result) => self.apply_backend_check(result),
            }
        }
        notices
    }

    fn apply_submission(&mut self, submission: u64, result: Result<String, ApiError>) {
        if submission != self.submission || self.phase != JobPhase::Submitting {
            tracing::debug!(submission, "Discarding stale submit result");
            return;
        }
        self.submit_task = None;

        match result {
            Ok(job_id) => {
                tracing::info!(job_id = %job_id, "Job accepted, polling for status");
                self.poll_task = Some(PollTask::spawn(
                    &self.runtime,
                    self.api.clone(),
                    job_id.clone(),
                    self.config.poll_interval,
                    self.events_tx.clone(),
                ));
                self.phase = JobPhase::Polling { job_id };
            }
            Err(e) => {
                tracing::error!(error = %e, "Error submitting job");
                self.fail(e.to_string());
            }
        }
    }

    fn apply_poll(&mut self, job_id: String, result: Result<StatusReport, ApiError>) {
        match &self.phase {
            JobPhase::Polling { job_id: current } if *current == job_id => {}
            _ => {
                tracing::debug!(job_id = %job_id, phase = self.phase.label(), "Discarding late status response");
                return;
            }
        }

        match result {
            Ok(report) => {
                self.transient_failures = 0;
                match report.status {
                    JobStatus::Processing => {
                        self.progress
                            .advance(self.config.progress_step, self.config.progress_ceiling);
                        tracing::debug!(job_id = %job_id, progress = self.progress.value(), "Still processing");
                    }
                    JobStatus::Completed => {
                        let video_url = match self.api.video_url(&job_id) {
                            Ok(url) => url,
                            Err(e) => {
                                tracing::error!(job_id = %job_id, error = %e, "Cannot locate finished video");
                                self.fail(e.to_string());
                                return;
                            }
                        };
                        self.stop_polling();
                        self.progress.complete();
                        tracing::info!(job_id = %job_id, video_url = %video_url, "Generation completed");
                        self.phase = JobPhase::Completed { job_id, video_url };
                    }
                    JobStatus::Failed => {
                        let reason = report
                            .error
                            .unwrap_or_else(|| "unknown error".to_string());
                        tracing::error!(job_id = %job_id, error = %reason, "Generation failed");
                        self.fail(reason);
                    }
                }
            }
            Err(e) if e.is_transient() => {
                self.transient_failures += 1;
                if self.transient_failures > self.config.max_transient_poll_failures {
                    tracing::error!(
                        job_id = %job_id,
                        error = %e,
                        failures = self.transient_failures,
                        "Status unavailable too many times in a row, giving up"
                    );
                    self.fail(format!("status unavailable: {}", e));
                } else {
                    tracing::debug!(
                        job_id = %job_id,
                        error = %e,
                        failures = self.transient_failures,
                        "Status not available yet"
                    );
                }
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Status check failed");
                self.fail(e.to_string());
            }
        }
    }

    fn apply_download(
        &mut self,
        destination: PathBuf,
        result: Result<u64, DownloadError>,
    ) -> ControllerNotice {
        self.download_task = None;
        match result {
            Ok(bytes) => ControllerNotice::DownloadSaved { destination, bytes },
            Err(e) => {
                tracing::error!(error = %e, destination = %destination.display(), "Download failed");
                ControllerNotice::DownloadFailed {
                    destination,
                    message: e.to_string(),
                }
            }
        }
    }

    fn apply_backend_check(&mut self, result: Result<String, ApiError>) {
        self.backend = match result {
            Ok(message) => {
                tracing::info!(message = %message, "Backend reachable");
                BackendStatus::Online(message)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backend unreachable");
                BackendStatus::Offline(e.to_string())
            }
        };
    }

    /// Terminal failure. The job id is forgotten; the image stays so the user
    /// can try again.
    fn fail(&mut self, reason: String) {
        self.stop_polling();
        self.transient_failures = 0;
        self.phase = JobPhase::Failed { reason };
    }

    fn stop_polling(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.cancel();
        }
    }
}

fn abort_task(task: &mut Option<JoinHandle<()>>) {
    if let Some(task) = task.take() {
        task.abort();
    }
}

impl Drop for JobController {
    fn drop(&mut self) {
        self.stop_polling();
        abort_task(&mut self.submit_task);
        abort_task(&mut self.download_task);
        abort_task(&mut self.backend_task);
    }
}
