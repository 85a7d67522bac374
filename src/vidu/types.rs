//! Wire types for the Vidu API.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Upstream-assigned task handle. The API may return either a string or a
/// number; the upstream type is preserved when echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl TaskId {
    /// Parse a task id typed by a user. Only canonical integers become
    /// numbers, so `"007"` stays text and round-trips unchanged.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.parse::<i64>() {
            Ok(n) if n.to_string() == input => TaskId::Number(n),
            _ => TaskId::Text(input.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TaskId::Text(s) if s.is_empty())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Generation endpoints exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TextToVideo,
    ImageToVideo,
    ReferenceToVideo,
    StartEndToVideo,
    TemplateToVideo,
}

impl Endpoint {
    /// Path suffix appended to the API host.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TextToVideo => "/ent/v2/text2video",
            Endpoint::ImageToVideo => "/ent/v2/img2video",
            Endpoint::ReferenceToVideo => "/ent/v2/reference2video",
            Endpoint::StartEndToVideo => "/ent/v2/start-end2video",
            Endpoint::TemplateToVideo => "/ent/v2/template2video",
        }
    }

    /// Path of the status endpoint for a task.
    pub fn creations_path(task_id: &TaskId) -> String {
        format!("/ent/v2/tasks/{}/creations", task_id)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Response body of the task status endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creations: Vec<Creation>,
}

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TaskStatus {
    pub fn task_state(&self) -> TaskState {
        TaskState::from(self.state.as_str())
    }
}

/// A generated artifact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Creation {
    #[serde(default)]
    pub url: Option<String>,
}

/// Interpretation of the upstream `state` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Success,
    Failed,
    /// Any other state means the job is still processing.
    Pending(String),
}

impl From<&str> for TaskState {
    fn from(state: &str) -> Self {
        match state {
            "success" => TaskState::Success,
            "failed" => TaskState::Failed,
            other => TaskState::Pending(other.to_string()),
        }
    }
}

/// Final output of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub task_id: TaskId,
    pub status: String,
    pub video_url: String,
}

impl GenerationResult {
    pub fn success(task_id: TaskId, video_url: String) -> Self {
        Self {
            task_id,
            status: "success".to_string(),
            video_url,
        }
    }

    /// Pretty-printed JSON handed back to the tool host.
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_id_keeps_upstream_type() {
        let numeric: TaskId = serde_json::from_value(json!(812345)).unwrap();
        assert_eq!(numeric, TaskId::Number(812345));
        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!(812345));

        let text: TaskId = serde_json::from_value(json!("task-abc")).unwrap();
        assert_eq!(text.to_string(), "task-abc");
        assert_eq!(serde_json::to_value(&text).unwrap(), json!("task-abc"));
    }

    #[test]
    fn test_task_id_parse() {
        assert_eq!(TaskId::parse(" 123 "), TaskId::Number(123));
        assert_eq!(TaskId::parse("abc"), TaskId::Text("abc".to_string()));
        assert_eq!(TaskId::parse("007"), TaskId::Text("007".to_string()));
        assert_eq!(TaskId::parse("+5"), TaskId::Text("+5".to_string()));
        assert_eq!(TaskId::parse("-3"), TaskId::Number(-3));
    }

    #[test]
    fn test_status_null_fields() {
        let status: TaskStatus =
            serde_json::from_value(json!({"state": "processing", "creations": null})).unwrap();
        assert_eq!(status.task_state(), TaskState::Pending("processing".to_string()));
        assert!(status.creations.is_empty());

        let status: TaskStatus =
            serde_json::from_value(json!({"state": null, "creations": null})).unwrap();
        assert_eq!(status.task_state(), TaskState::Pending(String::new()));
    }

    #[test]
    fn test_status_deserialization() {
        let status: TaskStatus = serde_json::from_value(json!({
            "state": "success",
            "creations": [{"id": "c1", "url": "https://cdn.example.com/v.mp4", "cover_url": "x"}]
        }))
        .unwrap();
        assert_eq!(status.task_state(), TaskState::Success);
        assert_eq!(
            status.creations[0].url.as_deref(),
            Some("https://cdn.example.com/v.mp4")
        );

        let pending: TaskStatus = serde_json::from_value(json!({"state": "processing"})).unwrap();
        assert_eq!(pending.task_state(), TaskState::Pending("processing".to_string()));
        assert!(pending.creations.is_empty());
    }

    #[test]
    fn test_creations_path() {
        assert_eq!(
            Endpoint::creations_path(&TaskId::Number(7)),
            "/ent/v2/tasks/7/creations"
        );
    }

    #[test]
    fn test_result_json() {
        let result = GenerationResult::success(TaskId::Number(1), "https://v".to_string());
        let json: serde_json::Value =
            serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            json,
            json!({"task_id": 1, "status": "success", "video_url": "https://v"})
        );
    }
}
