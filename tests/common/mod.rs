//! In-process mock of the video generation backend.
//!
//! Status responses are scripted per test; once the script runs out every
//! further poll answers `processing`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use vision2video::config::ApiConfig;
use vision2video::controller::JobController;
use vision2video::upload::{AssetOrigin, UploadedAsset};

pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake video payload";

/// How long `/outputs/slow*` waits before sending the video.
pub const SLOW_DOWNLOAD_DELAY: Duration = Duration::from_millis(300);

/// What `POST /generate_video` answers.
#[derive(Clone)]
pub enum SubmitReply {
    Job(&'static str),
    Status(StatusCode),
    Body(Value),
    /// Accept the request and never answer.
    Hang,
}

#[derive(Clone)]
pub struct MockBackend {
    submit_reply: Arc<Mutex<SubmitReply>>,
    status_script: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    pub submit_hits: Arc<AtomicUsize>,
    pub status_hits: Arc<AtomicUsize>,
    pub download_hits: Arc<AtomicUsize>,
    /// When set, `/status/{job_id}` accepts requests and never answers.
    pub hang_status: Arc<AtomicBool>,
    pub last_prompt: Arc<Mutex<Option<String>>>,
    pub last_image: Arc<Mutex<Option<(String, Vec<u8>)>>>,
}

impl MockBackend {
    pub fn new(submit_reply: SubmitReply) -> Self {
        Self {
            submit_reply: Arc::new(Mutex::new(submit_reply)),
            status_script: Arc::new(Mutex::new(VecDeque::new())),
            submit_hits: Arc::new(AtomicUsize::new(0)),
            status_hits: Arc::new(AtomicUsize::new(0)),
            download_hits: Arc::new(AtomicUsize::new(0)),
            hang_status: Arc::new(AtomicBool::new(false)),
            last_prompt: Arc::new(Mutex::new(None)),
            last_image: Arc::new(Mutex::new(None)),
        }
    }

    pub fn script_status(&self, code: u16, body: Value) {
        self.status_script
            .lock()
            .unwrap()
            .push_back((StatusCode::from_u16(code).unwrap(), body));
    }

    pub fn submits(&self) -> usize {
        self.submit_hits.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.status_hits.load(Ordering::SeqCst)
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Vision 2 Video API!" }))
}

async fn generate_video(State(state): State<MockBackend>, mut multipart: Multipart) -> Response {
    state.submit_hits.fetch_add(1, Ordering::SeqCst);

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let Ok(data) = field.bytes().await else {
            break;
        };
        match name.as_str() {
            "prompt" => {
                *state.last_prompt.lock().unwrap() =
                    Some(String::from_utf8_lossy(&data).to_string());
            }
            "image" => {
                *state.last_image.lock().unwrap() =
                    Some((file_name.unwrap_or_default(), data.to_vec()));
            }
            _ => {}
        }
    }

    let reply = state.submit_reply.lock().unwrap().clone();
    match reply {
        SubmitReply::Job(job_id) => Json(json!({ "job_id": job_id })).into_response(),
        SubmitReply::Status(code) => (code, "submission rejected").into_response(),
        SubmitReply::Body(body) => Json(body).into_response(),
        SubmitReply::Hang => std::future::pending().await,
    }
}

async fn status(State(state): State<MockBackend>, Path(_job_id): Path<String>) -> Response {
    state.status_hits.fetch_add(1, Ordering::SeqCst);
    if state.hang_status.load(Ordering::SeqCst) {
        return std::future::pending().await;
    }
    let next = state.status_script.lock().unwrap().pop_front();
    match next {
        Some((code, body)) => (code, Json(body)).into_response(),
        None => Json(json!({ "status": "processing" })).into_response(),
    }
}

async fn outputs(State(state): State<MockBackend>, Path(file): Path<String>) -> Response {
    state.download_hits.fetch_add(1, Ordering::SeqCst);
    if file.starts_with("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if file.starts_with("slow") {
        tokio::time::sleep(SLOW_DOWNLOAD_DELAY).await;
    }
    ([("content-type", "video/mp4")], VIDEO_BYTES).into_response()
}

fn mock_router(state: MockBackend) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/generate_video", post(generate_video))
        .route("/status/{job_id}", get(status))
        .route("/outputs/{file}", get(outputs))
        .with_state(state)
}

/// Start the mock server on a random port and return the base URL.
pub async fn start_mock_server(state: MockBackend) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let router = mock_router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    base_url
}

/// Config with a short poll period so tests finish quickly.
pub fn fast_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        poll_interval: Duration::from_millis(20),
        ..ApiConfig::new(base_url)
    }
}

pub fn controller_for(config: ApiConfig) -> JobController {
    JobController::new(config, tokio::runtime::Handle::current())
}

pub fn sample_image() -> UploadedAsset {
    UploadedAsset::new("sunset.png", vec![0x89, b'P', b'N', b'G', 1, 2, 3], None)
}

pub fn ready_controller(config: ApiConfig) -> JobController {
    let mut controller = controller_for(config);
    controller
        .accept_image(sample_image(), AssetOrigin::Picker)
        .expect("image accepted");
    controller
}

/// Pump controller events until `done` holds, calling `observe` after every
/// pump. Panics after five seconds.
pub async fn pump_until<D, O>(controller: &mut JobController, mut done: D, mut observe: O)
where
    D: FnMut(&JobController) -> bool,
    O: FnMut(&JobController),
{
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        controller.process_events();
        observe(&*controller);
        if done(&*controller) {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "timed out in phase {:?}",
            controller.phase()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub async fn wait_for<D>(controller: &mut JobController, done: D)
where
    D: FnMut(&JobController) -> bool,
{
    pump_until(controller, done, |_| {}).await;
}
