//! Transport abstraction for reaching the agent

use async_trait::async_trait;
use futures::StreamExt;

use crate::{
    error::{Error, Result},
    stream::ByteStream,
    types::{AgentRequest, DEFAULT_ENDPOINT, HistoryEntry, RunOptions},
};

/// Sends one turn's history and returns the streaming response body
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post `history` on `thread_id`, returning the raw body stream.
    ///
    /// A non-success status is an error carrying the status code and body text.
    async fn send(&self, history: Vec<HistoryEntry>, thread_id: &str) -> Result<ByteStream>;
}

/// Generate a thread id of the form `thread-<unix millis>-<9 char suffix>`
pub fn generate_thread_id() -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(9)
        .collect();
    format!("thread-{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// HTTP transport posting to the agent's stream endpoint
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    options: RunOptions,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with default run options
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| Error::InvalidConfig(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "endpoint must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            options: RunOptions::default(),
        })
    }

    /// Set run options
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Endpoint this transport posts to
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Current run options
    pub fn options(&self) -> &RunOptions {
        &self.options
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.parse().expect("default endpoint is a valid URL"),
            options: RunOptions::default(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, history: Vec<HistoryEntry>, thread_id: &str) -> Result<ByteStream> {
        let request = AgentRequest::new(history, thread_id, &self.options);

        tracing::debug!("Sending request to: {}", self.endpoint);
        tracing::debug!("Request payload: {}", serde_json::to_string_pretty(&request)?);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        tracing::trace!("Response headers: {:?}", response.headers());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Error response: {}", body);
            return Err(Error::status(status.as_u16(), body));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::Stream(e.to_string())));
        Ok(Box::pin(body))
    }
}
