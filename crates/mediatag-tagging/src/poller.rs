//! Submit-then-poll engine for asynchronous backend jobs.
//!
//! A job is submitted once, then its status is queried on a fixed interval until it succeeds,
//! fails, or the attempt ceiling is reached. The timeout counts status queries, not wall-clock
//! time. The loop is awaited inline by the calling tagger; nothing is spawned.
//!
//! Timed-out jobs are not cancelled. Transcribe and Rekognition video jobs keep running (and
//! billing) until the backend finishes them; the poller only logs a warning.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{sleep, Instant};

/// What one status query reported.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus<H> {
    Running,
    /// The handle carries whatever is needed to fetch the result.
    Succeeded(H),
    Failed(Option<String>),
}

/// One asynchronous backend operation, as seen by the poller.
#[async_trait]
pub trait BackendJob: Send + Sync {
    /// Reported by a successful status query
    type Handle: Send;
    type Output: Send;

    /// Short name used in logs ("transcription", "video_labels")
    fn kind(&self) -> &'static str;

    async fn submit(&self) -> anyhow::Result<String>;

    async fn query(&self, job_id: &str) -> anyhow::Result<PollStatus<Self::Handle>>;

    /// Fetch and parse the result payload.
    async fn fetch(&self, handle: Self::Handle) -> anyhow::Result<Self::Output>;

    /// Location of the result payload, if the handle has one. Only used for logging.
    fn result_locator(_handle: &Self::Handle) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Submitted,
    Running,
    Succeeded,
    Failed,
    TimedOut,
}

/// Poller-side record of an in-flight job. Lives only as long as one `JobPoller::run` call.
#[derive(Debug, Clone)]
pub struct TaggingJob {
    pub backend_job_id: String,
    pub submitted_at: Instant,
    pub status: JobPhase,
    pub result_locator: Option<String>,
    pub attempts: u32,
}

impl TaggingJob {
    fn submitted(backend_job_id: String) -> Self {
        Self {
            backend_job_id,
            submitted_at: Instant::now(),
            status: JobPhase::Submitted,
            result_locator: None,
            attempts: 0,
        }
    }

    fn elapsed_ms(&self) -> f64 {
        self.submitted_at.elapsed().as_secs_f64() * 1000.0
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("job submission failed: {0:#}")]
    Submit(#[source] anyhow::Error),

    #[error("status query for job {job_id} failed after {attempts} attempts: {source:#}")]
    Query {
        job_id: String,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    #[error("job {job_id} still running after {attempts} status queries")]
    TimedOut { job_id: String, attempts: u32 },

    #[error("fetching result of job {job_id} failed: {source:#}")]
    Fetch {
        job_id: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct JobPoller {
    interval: Duration,
    max_attempts: u32,
}

impl JobPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Drive `job` to a terminal state.
    ///
    /// Makes at most `max_attempts` status queries. Submission and status-query errors are
    /// terminal; nothing is retried.
    pub async fn run<J: BackendJob>(&self, job: &J, key: &str) -> Result<J::Output, PollError> {
        let kind = job.kind();
        let job_id = job.submit().await.map_err(PollError::Submit)?;
        let mut state = TaggingJob::submitted(job_id);

        tracing::info!(
            kind,
            key = %key,
            job_id = %state.backend_job_id,
            max_attempts = self.max_attempts,
            "Backend job submitted"
        );

        let handle = loop {
            let status = match job.query(&state.backend_job_id).await {
                Ok(status) => status,
                Err(source) => {
                    state.status = JobPhase::Failed;
                    return Err(PollError::Query {
                        job_id: state.backend_job_id,
                        attempts: state.attempts,
                        source,
                    });
                }
            };

            match status {
                PollStatus::Succeeded(handle) => {
                    state.status = JobPhase::Succeeded;
                    state.result_locator = J::result_locator(&handle);
                    break handle;
                }
                PollStatus::Failed(reason) => {
                    state.status = JobPhase::Failed;
                    return Err(PollError::JobFailed {
                        job_id: state.backend_job_id,
                        reason: reason.unwrap_or_else(|| "no reason reported".to_string()),
                    });
                }
                PollStatus::Running => {
                    state.status = JobPhase::Running;
                    state.attempts += 1;
                    if state.attempts >= self.max_attempts {
                        state.status = JobPhase::TimedOut;
                        tracing::warn!(
                            kind,
                            key = %key,
                            job_id = %state.backend_job_id,
                            attempts = state.attempts,
                            duration_ms = state.elapsed_ms(),
                            "Backend job timed out; leaving it running on the backend"
                        );
                        return Err(PollError::TimedOut {
                            job_id: state.backend_job_id,
                            attempts: state.attempts,
                        });
                    }
                    tracing::debug!(
                        kind,
                        job_id = %state.backend_job_id,
                        attempts = state.attempts,
                        "Backend job still running"
                    );
                    sleep(self.interval).await;
                }
            }
        };

        tracing::info!(
            kind,
            key = %key,
            job_id = %state.backend_job_id,
            attempts = state.attempts,
            result_locator = state.result_locator.as_deref().unwrap_or(""),
            duration_ms = state.elapsed_ms(),
            "Backend job succeeded"
        );

        job.fetch(handle).await.map_err(|source| PollError::Fetch {
            job_id: state.backend_job_id,
            source,
        })
    }
}
