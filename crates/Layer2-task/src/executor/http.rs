//! HTTP executor client
//!
//! Talks to the executor REST API with `reqwest`. One client is built per
//! process and shared by every tracking session.

use super::r#trait::{ContentFetcher, ExecutorClient};
use crate::task::{FileId, StoredFile, TaskDetail, TaskHandle, TaskId, TaskSpec, WorkspaceId};
use async_trait::async_trait;
use relay_foundation::{Error, ExecutorSettings, Result};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Header carrying the executor API key
const API_KEY_HEADER: &str = "x-openserv-key";

/// HTTP executor client configuration
#[derive(Debug, Clone)]
pub struct HttpExecutorConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl HttpExecutorConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build from loaded settings. The api key must already be validated.
    pub fn from_settings(settings: &ExecutorSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| Error::MissingEnv(vec![relay_foundation::ENV_API_KEY.to_string()]))?;
        Ok(Self {
            base_url: settings.base_url.clone(),
            api_key,
            timeout: settings.request_timeout(),
        })
    }
}

/// Executor client backed by the REST API
pub struct HttpExecutorClient {
    client: reqwest::Client,
    config: HttpExecutorConfig,
}

impl HttpExecutorClient {
    pub fn new(config: HttpExecutorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.config.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| Error::Http(format!("Invalid response body: {}", e)))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
    Err(Error::api(status.as_u16(), message))
}

#[async_trait]
impl ExecutorClient for HttpExecutorClient {
    async fn submit_task(&self, spec: &TaskSpec) -> Result<TaskHandle> {
        let url = self.url(&format!("/workspaces/{}/task", spec.workspace));
        debug!("POST {}", url);
        self.send_json(self.client.post(&url).json(spec)).await
    }

    async fn get_task_status(
        &self,
        task_id: &TaskId,
        workspace: WorkspaceId,
    ) -> Result<TaskDetail> {
        let url = self.url(&format!("/workspaces/{}/tasks/{}/detail", workspace, task_id));
        debug!("GET {}", url);
        self.send_json(self.client.get(&url)).await
    }

    async fn list_files(&self, workspace: WorkspaceId) -> Result<Vec<StoredFile>> {
        let url = self.url(&format!("/workspaces/{}/files", workspace));
        debug!("GET {}", url);
        self.send_json(self.client.get(&url)).await
    }

    async fn delete_file(&self, workspace: WorkspaceId, file_id: &FileId) -> Result<()> {
        let url = self.url(&format!("/workspaces/{}/files/{}", workspace, file_id));
        debug!("DELETE {}", url);
        self.send(self.client.delete(&url)).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Plain GET content fetcher
pub struct HttpContentFetcher {
    client: reqwest::Client,
}

impl HttpContentFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| Error::Http(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let client =
            HttpExecutorClient::new(HttpExecutorConfig::new("http://localhost:8080/", "key"))
                .unwrap();
        assert_eq!(
            client.url("/workspaces/1/files"),
            "http://localhost:8080/workspaces/1/files"
        );
    }

    #[test]
    fn test_config_requires_api_key() {
        let settings = ExecutorSettings::default();
        assert!(matches!(
            HttpExecutorConfig::from_settings(&settings),
            Err(Error::MissingEnv(_))
        ));
    }

    #[tokio::test]
    async fn test_fetcher_unreachable_is_http_error() {
        let fetcher = HttpContentFetcher::new(Duration::from_millis(500)).unwrap();

        let result = fetcher.fetch("http://127.0.0.1:9/result.txt").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[tokio::test]
    async fn test_unreachable_executor_is_http_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let mut config = HttpExecutorConfig::new("http://127.0.0.1:9", "key");
        config.timeout = Duration::from_millis(500);
        let client = HttpExecutorClient::new(config).unwrap();

        let result = client.list_files(WorkspaceId(1)).await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
