//! HTTP access to the node's message endpoint.
//!
//! - `GET <base>/messages` returns a JSON array of raw log lines
//! - `POST <base>/send` takes `{"message": "<text>"}`; the body of the answer is ignored

use crate::error::TransportError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// The two calls the feed needs from a server.
///
/// `fetch_messages` hands back the decoded JSON untouched so the caller can
/// tell a list apart from any other shape.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn fetch_messages(&self) -> Result<Value, TransportError>;
    async fn post_message(&self, text: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Serialize)]
struct SendBody<'a> {
    message: &'a str,
}

/// `reqwest` implementation of [`MessageTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    messages_url: String,
    send_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, None)
    }

    /// No timeout unless one is given: requests wait on the transport.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(TransportError::BaseUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder().user_agent("alertmesh-client");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            messages_url: format!("{base}/messages"),
            send_url: format!("{base}/send"),
        })
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }
}

#[async_trait]
impl MessageTransport for HttpTransport {
    async fn fetch_messages(&self) -> Result<Value, TransportError> {
        let url = &self.messages_url;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| TransportError::Request { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { url: url.clone(), status: status.as_u16() });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|source| TransportError::Decode { url: url.clone(), source })?;
        debug!("fetched payload from {}", url);
        Ok(body)
    }

    async fn post_message(&self, text: &str) -> Result<(), TransportError> {
        let url = &self.send_url;
        let response = self
            .client
            .post(url)
            .json(&SendBody { message: text })
            .send()
            .await
            .map_err(|source| TransportError::Request { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { url: url.clone(), status: status.as_u16() });
        }
        Ok(())
    }
}
