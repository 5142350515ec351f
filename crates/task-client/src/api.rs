use async_trait::async_trait;
use db::models::task_item::{CreateTaskItem, TaskItem, UpdateTaskItem};
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to reach task API ({method} {url}): {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Task API returned {status} for {method} {url}: {message}")]
    Http {
        status: StatusCode,
        method: &'static str,
        url: String,
        message: String,
    },
    #[error("Failed to parse task API response ({method} {url}): {source}")]
    Decode {
        method: &'static str,
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Http { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<TaskItem>, ClientError>;
    async fn get_task(&self, id: i64) -> Result<TaskItem, ClientError>;
    async fn create_task(&self, payload: &CreateTaskItem) -> Result<TaskItem, ClientError>;
    async fn update_task(&self, id: i64, payload: &UpdateTaskItem)
    -> Result<TaskItem, ClientError>;
    async fn delete_task(&self, id: i64) -> Result<(), ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    /// `base_url` points at the API root, e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send(
        &self,
        rb: reqwest::RequestBuilder,
        method: &'static str,
        url: &str,
    ) -> Result<String, ClientError> {
        let transport = |source| ClientError::Transport {
            method,
            url: url.to_string(),
            source,
        };

        let resp = rb.send().await.map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;

        if !status.is_success() {
            tracing::debug!(%status, method, url, "Task API request failed");
            return Err(ClientError::Http {
                status,
                method,
                url: url.to_string(),
                message: error_message(&body, status),
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        rb: reqwest::RequestBuilder,
        method: &'static str,
        url: &str,
    ) -> Result<T, ClientError> {
        let body = self.send(rb, method, url).await?;
        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            method,
            url: url.to_string(),
            source,
        })
    }

    async fn send_ok(
        &self,
        rb: reqwest::RequestBuilder,
        method: &'static str,
        url: &str,
    ) -> Result<(), ClientError> {
        self.send(rb, method, url).await.map(|_| ())
    }
}

fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(ErrorEnvelope {
        message: Some(message),
    }) = serde_json::from_str::<ErrorEnvelope>(body)
    {
        return message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }
    truncate_body(trimmed, 200)
}

fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<TaskItem>, ClientError> {
        let url = self.url("/tasks");
        self.send_json(self.client.get(&url), "GET", &url).await
    }

    async fn get_task(&self, id: i64) -> Result<TaskItem, ClientError> {
        let url = self.url(&format!("/tasks/{id}"));
        self.send_json(self.client.get(&url), "GET", &url).await
    }

    async fn create_task(&self, payload: &CreateTaskItem) -> Result<TaskItem, ClientError> {
        let url = self.url("/tasks");
        self.send_json(self.client.post(&url).json(payload), "POST", &url)
            .await
    }

    async fn update_task(
        &self,
        id: i64,
        payload: &UpdateTaskItem,
    ) -> Result<TaskItem, ClientError> {
        let url = self.url(&format!("/tasks/{id}"));
        self.send_json(self.client.put(&url).json(payload), "PUT", &url)
            .await
    }

    async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        let url = self.url(&format!("/tasks/{id}"));
        self.send_ok(self.client.delete(&url), "DELETE", &url).await
    }
}
