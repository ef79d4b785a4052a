use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::api::MeshyApi;
use crate::config::MeshyConfig;
use crate::error::{MeshyError, Result};
use crate::task::TaskHandle;
use crate::types::{ImageInput, TaskKind, TaskResponse};

const STORAGE_PATH: &str = "/customers/storage";

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

#[derive(Debug, Deserialize)]
struct StorageSlot {
    upload_url: String,
    download_url: String,
}

/// Async client for the Meshy endpoints behind the API proxy.
///
/// Attaches the configured credentials to every proxy request and exposes
/// the submit / poll / upload / fetch calls through [`MeshyApi`].
///
/// # Example
/// ```no_run
/// use meshy_nodes::{MeshyApi, MeshyClient, MeshyConfig, TaskHandle, TaskKind};
///
/// # async fn example() -> meshy_nodes::Result<()> {
/// let client = MeshyClient::new(MeshyConfig::from_env());
/// let status = client.poll(TaskKind::TextTo3d, &TaskHandle::new("task-id")).await?;
/// println!("{}", status["status"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MeshyClient {
    http: Client,
    config: MeshyConfig,
}

impl MeshyClient {
    /// Create a client from a config.
    pub fn new(mut config: MeshyConfig) -> Self {
        config.base_url = normalize(config.base_url);
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Returns the configured proxy URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &MeshyConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request.timeout(self.config.request_timeout);
        if let Some(key) = &self.config.api_key {
            request = request.header("X-API-KEY", key);
        }
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<Response> {
        let resp = request.send().await.map_err(|e| MeshyError::Network {
            context: context.to_string(),
            source: e,
        })?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(MeshyError::Http { status, body });
        }
        Ok(resp)
    }

    async fn json_body(resp: Response, context: &str) -> Result<Value> {
        resp.json().await.map_err(|e| MeshyError::Network {
            context: context.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl MeshyApi for MeshyClient {
    async fn submit(&self, kind: TaskKind, body: Value) -> Result<TaskHandle> {
        let url = self.url(kind.path());
        debug!(%kind, %url, "submitting Meshy task");
        let resp = self
            .send(
                self.authorized(self.http.post(&url)).json(&body),
                &format!("Failed to submit {} task", kind),
            )
            .await?;
        let json = Self::json_body(resp, "Failed to parse Meshy task response").await?;
        let task: TaskResponse = serde_json::from_value(json).map_err(|_| {
            MeshyError::InvalidResponse("Meshy task response missing 'result'".into())
        })?;
        if task.result.is_empty() {
            return Err(MeshyError::InvalidResponse(
                "Meshy task response has an empty task id".into(),
            ));
        }
        info!(%kind, task_id = %task.result, "submitted Meshy task");
        Ok(TaskHandle::new(task.result))
    }

    async fn poll(&self, kind: TaskKind, handle: &TaskHandle) -> Result<Value> {
        let url = self.url(&kind.status_path(handle.as_str()));
        let resp = self
            .send(
                self.authorized(self.http.get(&url)),
                &format!("Failed to fetch status of task {}", handle),
            )
            .await?;
        Self::json_body(resp, "Failed to parse Meshy status response").await
    }

    async fn upload_image(&self, image: &ImageInput) -> Result<String> {
        let body = json!({
            "file_name": image.file_name,
            "content_type": image.content_type,
        });
        let resp = self
            .send(
                self.authorized(self.http.post(self.url(STORAGE_PATH))).json(&body),
                "Failed to request an upload slot",
            )
            .await?;
        let json = Self::json_body(resp, "Failed to parse upload slot response").await?;
        let slot: StorageSlot = serde_json::from_value(json).map_err(|_| {
            MeshyError::InvalidResponse("Upload slot response missing upload_url/download_url".into())
        })?;

        // The signed upload URL carries its own auth; proxy credentials stay off it.
        self.send(
            self.http
                .put(&slot.upload_url)
                .timeout(self.config.request_timeout)
                .header(reqwest::header::CONTENT_TYPE, image.content_type.as_str())
                .body(image.bytes.clone()),
            &format!("Failed to upload {}", image.file_name),
        )
        .await?;
        debug!(file = %image.file_name, bytes = image.bytes.len(), "uploaded image");
        Ok(slot.download_url)
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        if url.is_empty() {
            return Err(MeshyError::InvalidResponse(
                "Task succeeded but returned no model URL".into(),
            ));
        }
        let mut request = self.http.get(url);
        if let Some(timeout) = self.config.download_timeout {
            request = request.timeout(timeout);
        }
        let resp = self.send(request, "Failed to download model").await?;

        let io_err = |source: std::io::Error| MeshyError::Io {
            path: dest.to_path_buf(),
            source,
        };
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
        let mut stream = resp.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| MeshyError::Network {
                context: "Failed to read model bytes".into(),
                source: e,
            })?;
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_err)?;
        info!(path = %dest.display(), bytes = written, "downloaded model");
        Ok(())
    }
}
