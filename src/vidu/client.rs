//! Authenticated HTTP client for the Vidu API.

use super::types::{Endpoint, TaskId, TaskStatus};
use crate::config::Credentials;
use crate::error::{Result, ViduError};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// API error code signalling rejected credentials.
const AUTH_ERROR_CODE: i64 = 401;

/// Operations the rest of the crate needs from the upstream API.
#[async_trait]
pub trait ViduApi: Send + Sync {
    /// Submit a generation job and return its task id.
    async fn submit(&self, endpoint: Endpoint, payload: &Value) -> Result<TaskId>;

    /// Fetch the current status of a task.
    async fn fetch_status(&self, task_id: &TaskId) -> Result<TaskStatus>;
}

/// HTTP client for the Vidu API. Cheap to share; the underlying
/// connection pool is reused across calls.
pub struct ViduClient {
    http: reqwest::Client,
    api_host: String,
    auth_header: String,
}

impl ViduClient {
    /// Create a client for the given credentials.
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_host: credentials.api_host.trim_end_matches('/').to_string(),
            auth_header: format!("Token {}", credentials.api_key),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_host, path)
    }

    /// Send a request and return the JSON body after API error checks.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .map_err(request_failed)?;

        let response = response.error_for_status().map_err(request_failed)?;
        let body: Value = response.json().await.map_err(request_failed)?;

        check_api_error(body)
    }
}

#[async_trait]
impl ViduApi for ViduClient {
    #[instrument(skip(self, payload))]
    async fn submit(&self, endpoint: Endpoint, payload: &Value) -> Result<TaskId> {
        let request = self
            .http
            .post(self.url(endpoint.path()))
            .header(CONTENT_TYPE, "application/json")
            .json(payload);

        let body = self.send(request).await?;
        let task_id = parse_task_id(&body)?;
        debug!("Submitted task {}", task_id);
        Ok(task_id)
    }

    #[instrument(skip(self))]
    async fn fetch_status(&self, task_id: &TaskId) -> Result<TaskStatus> {
        let request = self.http.get(self.url(&Endpoint::creations_path(task_id)));
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }
}

fn request_failed(err: reqwest::Error) -> ViduError {
    warn!("Vidu request failed: {}", err);
    ViduError::RequestFailed(format!("Request failed: {}", err))
}

/// Inspect the API-level `code` field of a successful HTTP response.
///
/// A 401 code means the key or host is wrong; any other non-null code is a
/// request failure. Both carry the upstream message and trace id.
pub fn check_api_error(body: Value) -> Result<Value> {
    let code = match body.get("code") {
        None | Some(Value::Null) => return Ok(body),
        Some(code) => code,
    };

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let trace_id = body
        .get("metadata")
        .and_then(|m| m.get("trace_id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let is_auth = code.as_i64() == Some(AUTH_ERROR_CODE)
        || code.as_str().and_then(|c| c.parse::<i64>().ok()) == Some(AUTH_ERROR_CODE);

    if is_auth {
        return Err(ViduError::AuthFailed { message, trace_id });
    }

    Err(ViduError::RequestFailed(format!(
        "API Error: {} Trace-Id: {}",
        message,
        trace_id.as_deref().unwrap_or("none")
    )))
}

/// Pull the task id out of a submit response.
fn parse_task_id(body: &Value) -> Result<TaskId> {
    body.get("task_id")
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value::<TaskId>(v.clone()).ok())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ViduError::RequestFailed("Failed to get task_id from response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single HTTP request with a canned response and hand back the
    /// raw request text.
    async fn serve_once(status: &str, body: Value) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = format!("http://{}", listener.local_addr().unwrap());
        let status = status.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            let header_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                raw.extend_from_slice(&buf[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&raw[..header_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while raw.len() < header_end + content_length {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }

            let body = body.to_string();
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&raw).to_string()
        });

        (host, handle)
    }

    fn client_for(host: &str) -> ViduClient {
        let creds = Credentials {
            api_key: "test-key".to_string(),
            api_host: host.to_string(),
        };
        ViduClient::new(&creds, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_http_error_status_is_request_failure() {
        let (host, server) = serve_once("500 Internal Server Error", json!({"message": "boom"})).await;

        let err = client_for(&host)
            .fetch_status(&TaskId::Number(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ViduError::RequestFailed(_)));
        assert!(err.to_string().starts_with("Request failed:"));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /ent/v2/tasks/1/creations "));
        assert!(request.contains("authorization: token test-key"));
    }

    #[tokio::test]
    async fn test_api_auth_code_in_ok_body() {
        let (host, server) = serve_once(
            "200 OK",
            json!({"code": 401, "message": "unauthorized", "metadata": {"trace_id": "trace-401"}}),
        )
        .await;

        let err = client_for(&host)
            .submit(Endpoint::TextToVideo, &json!({"prompt": "rain"}))
            .await
            .unwrap_err();

        match err {
            ViduError::AuthFailed { message, trace_id } => {
                assert_eq!(message, "unauthorized");
                assert_eq!(trace_id.as_deref(), Some("trace-401"));
            }
            other => panic!("Expected AuthFailed, got {:?}", other),
        }

        let request = server.await.unwrap();
        let lower = request.to_lowercase();
        assert!(lower.starts_with("post /ent/v2/text2video "));
        assert!(lower.contains("authorization: token test-key"));
        assert!(lower.contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"prompt":"rain"}"#));
    }

    #[tokio::test]
    async fn test_submit_success_returns_task_id() {
        let (host, server) = serve_once("200 OK", json!({"task_id": "812", "state": "created"})).await;

        let task_id = client_for(&host)
            .submit(Endpoint::ImageToVideo, &json!({"images": ["https://a"]}))
            .await
            .unwrap();

        assert_eq!(task_id, TaskId::Text("812".to_string()));
        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /ent/v2/img2video "));
        assert!(request.contains("authorization: token test-key"));
    }

    #[tokio::test]
    async fn test_fetch_status_accepts_null_creations() {
        let (host, server) = serve_once("200 OK", json!({"state": "processing", "creations": null})).await;

        let status = client_for(&host)
            .fetch_status(&TaskId::Number(5))
            .await
            .unwrap();

        assert_eq!(status.state, "processing");
        assert!(status.creations.is_empty());
        server.await.unwrap();
    }

    #[test]
    fn test_body_without_code_passes() {
        let body = json!({"task_id": 5, "state": "created"});
        assert_eq!(check_api_error(body.clone()).unwrap(), body);

        let body = json!({"code": null, "state": "created"});
        assert!(check_api_error(body).is_ok());
    }

    #[test]
    fn test_auth_failure_carries_trace_id() {
        let body = json!({
            "code": 401,
            "message": "invalid api key",
            "metadata": {"trace_id": "trace-789"}
        });

        match check_api_error(body).unwrap_err() {
            ViduError::AuthFailed { message, trace_id } => {
                assert_eq!(message, "invalid api key");
                assert_eq!(trace_id.as_deref(), Some("trace-789"));
            }
            other => panic!("Expected AuthFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_other_codes_are_request_failures() {
        let body = json!({
            "code": 400,
            "message": "prompt too long",
            "metadata": {"trace_id": "t-1"}
        });

        let err = check_api_error(body).unwrap_err();
        assert!(matches!(err, ViduError::RequestFailed(_)));
        assert_eq!(err.to_string(), "API Error: prompt too long Trace-Id: t-1");
    }

    #[test]
    fn test_string_auth_code() {
        let body = json!({"code": "401", "message": "nope"});
        assert!(matches!(
            check_api_error(body).unwrap_err(),
            ViduError::AuthFailed { trace_id: None, .. }
        ));
    }

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id(&json!({"task_id": 99})).unwrap(), TaskId::Number(99));
        assert_eq!(
            parse_task_id(&json!({"task_id": "abc"})).unwrap(),
            TaskId::Text("abc".to_string())
        );
        assert!(parse_task_id(&json!({"task_id": ""})).is_err());
        assert!(parse_task_id(&json!({"state": "created"})).is_err());
    }

    #[test]
    fn test_client_trims_host() {
        let creds = Credentials {
            api_key: "k".to_string(),
            api_host: "https://api.vidu.com/".to_string(),
        };
        let client = ViduClient::new(&creds, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.url(Endpoint::TextToVideo.path()),
            "https://api.vidu.com/ent/v2/text2video"
        );
        assert_eq!(client.auth_header, "Token k");
    }
}
