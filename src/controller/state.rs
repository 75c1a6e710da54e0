/// Where the current job stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Ready,
    Submitting,
    Polling {
        job_id: String,
    },
    Completed {
        job_id: String,
        video_url: String,
    },
    Failed {
        reason: String,
    },
}

impl JobPhase {
    /// A request for the current job is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, JobPhase::Submitting | JobPhase::Polling { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed { .. } | JobPhase::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobPhase::Idle => "idle",
            JobPhase::Ready => "ready",
            JobPhase::Submitting => "submitting",
            JobPhase::Polling { .. } => "polling",
            JobPhase::Completed { .. } => "completed",
            JobPhase::Failed { .. } => "failed",
        }
    }
}

/// Result of the startup probe against the backend root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Online(String),
    Offline(String),
}
