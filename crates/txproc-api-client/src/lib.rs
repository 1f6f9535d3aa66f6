//! HTTP client for the tx-processor API.
//!
//! Provides a minimal transport that attaches the `X-API-KEY` header to every
//! backend call, the domain methods for each workflow step (register, transfer,
//! trigger, worker status), the worker monitor, and the coordinator that runs
//! one file through the whole pipeline.

pub mod api;
pub mod error;
pub mod monitor;
pub mod report;
pub mod workflow;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use txproc_core::ClientConfig;

pub use api::{storage_headers, TransferReceipt, UploadStatusPolicy};
pub use error::{ClientError, Result};
pub use monitor::{MonitorOptions, MonitorOutcome, MonitorState, Progress, Transition};
pub use report::{NoopReporter, Reporter, Step, WorkflowEvent};
pub use workflow::{Workflow, WorkflowOptions, WorkflowReport};

/// Header carrying the static API key on every backend call.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// HTTP client for the tx-processor API. One request is one attempt: no retries.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(concat!("txproc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Transport {
                endpoint: "client setup".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.apply_auth(self.client.get(self.build_url(path)));
        self.send_json(path, request).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let payload = serde_json::to_vec(body).map_err(|source| ClientError::Encode {
            endpoint: path.to_string(),
            source,
        })?;
        let request = self
            .apply_auth(self.client.post(self.build_url(path)))
            .body(payload);
        self.send_json(path, request).await
    }

    async fn send_json<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: path.to_string(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }

    /// Raw client for requests that must not carry the API key (pre-signed URLs).
    pub fn client(&self) -> &Client {
        &self.client
    }
}
