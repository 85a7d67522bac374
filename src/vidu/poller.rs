//! Polling of submitted generation tasks.
//!
//! Generation takes minutes, so after submission the task status endpoint
//! is queried on a fixed interval until the job succeeds, fails, or the
//! attempt budget runs out. Transport and API errors while polling end the
//! wait immediately; only an explicit "still processing" state is retried.

use super::client::ViduApi;
use super::types::{GenerationResult, TaskId, TaskState, TaskStatus};
use crate::error::{Result, ViduError};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default wait between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// Default number of status checks (10 minutes at the default interval).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Polling schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Result of evaluating a single status response.
#[derive(Debug)]
pub enum PollOutcome {
    Succeeded(GenerationResult),
    Failed(ViduError),
    Pending,
}

impl PollOutcome {
    /// Decide what a status response means for the given task.
    pub fn evaluate(task_id: &TaskId, status: &TaskStatus) -> Self {
        match status.task_state() {
            TaskState::Failed => PollOutcome::Failed(ViduError::GenerationFailed {
                task_id: task_id.to_string(),
            }),
            TaskState::Success => {
                let url = status
                    .creations
                    .first()
                    .and_then(|c| c.url.as_deref())
                    .filter(|u| !u.is_empty());

                match url {
                    Some(url) => PollOutcome::Succeeded(GenerationResult::success(
                        task_id.clone(),
                        url.to_string(),
                    )),
                    None => PollOutcome::Failed(ViduError::MalformedResponse(format!(
                        "Missing creation_url in success response for task_id: {}",
                        task_id
                    ))),
                }
            }
            TaskState::Pending(_) => PollOutcome::Pending,
        }
    }
}

/// Waits for a single task to finish. Holds no state between calls.
pub struct JobPoller<'a> {
    api: &'a dyn ViduApi,
    config: PollConfig,
}

impl<'a> JobPoller<'a> {
    pub fn new(api: &'a dyn ViduApi, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Poll until the task reaches a terminal state.
    #[instrument(skip(self), fields(max_attempts = self.config.max_attempts))]
    pub async fn wait(&self, task_id: TaskId) -> Result<GenerationResult> {
        for attempt in 1..=self.config.max_attempts {
            let status = self.api.fetch_status(&task_id).await?;

            match PollOutcome::evaluate(&task_id, &status) {
                PollOutcome::Succeeded(result) => {
                    info!("Task {} succeeded after {} polls", task_id, attempt);
                    return Ok(result);
                }
                PollOutcome::Failed(err) => {
                    warn!("Task {} ended: {}", task_id, err);
                    return Err(err);
                }
                PollOutcome::Pending => {
                    debug!(
                        "Task {} still {} ({}/{})",
                        task_id, status.state, attempt, self.config.max_attempts
                    );
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        warn!("Task {} timed out", task_id);
        Err(ViduError::Timeout {
            task_id: task_id.to_string(),
            attempts: self.config.max_attempts,
        })
    }
}
