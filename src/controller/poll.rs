use super::JobEvent;
use crate::api::JobApiClient;
use std::sync::mpsc::Sender;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};

/// Background status poller for a single job.
///
/// Ticks on a fixed period whether or not earlier requests have answered,
/// so requests can overlap when the backend is slower than the period; the
/// client's request timeout bounds how many can be outstanding. Each
/// request reports back as a [`JobEvent::Polled`]. Aborting the task (or
/// dropping the handle) also aborts every request still in flight.
pub(crate) struct PollTask {
    job_id: String,
    handle: JoinHandle<()>,
}

impl PollTask {
    pub(crate) fn spawn(
        runtime: &Handle,
        api: JobApiClient,
        job_id: String,
        period: Duration,
        events: Sender<JobEvent>,
    ) -> Self {
        let task_job_id = job_id.clone();
        let handle = runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            // After a stall, poll once and carry on rather than catching up.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut in_flight = JoinSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let api = api.clone();
                        let job_id = task_job_id.clone();
                        let events = events.clone();
                        in_flight.spawn(async move {
                            let result = api.poll_once(&job_id).await;
                            // Receiver gone means the controller is gone.
                            let _ = events.send(JobEvent::Polled { job_id, result });
                        });
                    }
                    Some(_) = in_flight.join_next() => {}
                }
            }
        });

        tracing::debug!(job_id = %job_id, period_ms = period.as_millis() as u64, "Poll task started");
        Self { job_id, handle }
    }

    pub(crate) fn cancel(self) {
        tracing::debug!(job_id = %self.job_id, "Poll task cancelled");
        // Drop aborts.
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
