//! Scripted API double shared by unit tests.

use super::client::ViduApi;
use super::types::{Creation, Endpoint, TaskId, TaskStatus};
use crate::error::{Result, ViduError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Status response in the given state with no creations.
pub fn status(state: &str) -> TaskStatus {
    TaskStatus {
        state: state.to_string(),
        creations: Vec::new(),
    }
}

/// Successful status response with one creation.
pub fn success(url: &str) -> TaskStatus {
    TaskStatus {
        state: "success".to_string(),
        creations: vec![Creation {
            url: Some(url.to_string()),
        }],
    }
}

/// Replays a fixed sequence of status responses. Once the script runs out,
/// every poll reports "processing".
pub struct ScriptedApi {
    task_id: TaskId,
    submit_error: Mutex<Option<ViduError>>,
    statuses: Mutex<VecDeque<Result<TaskStatus>>>,
    submissions: Mutex<Vec<(Endpoint, Value)>>,
    polls: AtomicU32,
}

impl ScriptedApi {
    pub fn new(statuses: Vec<Result<TaskStatus>>) -> Self {
        Self {
            task_id: TaskId::Number(42),
            submit_error: Mutex::new(None),
            statuses: Mutex::new(statuses.into()),
            submissions: Mutex::new(Vec::new()),
            polls: AtomicU32::new(0),
        }
    }

    /// Make the next submit call fail with the given error.
    pub fn failing_submit(self, err: ViduError) -> Self {
        *self.submit_error.lock().unwrap() = Some(err);
        self
    }

    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<(Endpoint, Value)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ViduApi for ScriptedApi {
    async fn submit(&self, endpoint: Endpoint, payload: &Value) -> Result<TaskId> {
        if let Some(err) = self.submit_error.lock().unwrap().take() {
            return Err(err);
        }
        self.submissions
            .lock()
            .unwrap()
            .push((endpoint, payload.clone()));
        Ok(self.task_id.clone())
    }

    async fn fetch_status(&self, _task_id: &TaskId) -> Result<TaskStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status("processing")))
    }
}
