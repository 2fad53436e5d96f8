//! The network seam.
//!
//! [`Transport`] turns a [`PlayRequest`] into a response body or a typed
//! [`TransportError`]. Everything above it is synchronous parsing, so tests
//! can drive the whole engine with a scripted in-memory transport.

use std::future::Future;
use std::time::Duration;

use gplay_core::AppConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, RETRY_AFTER};
use reqwest::{Client, StatusCode};

use crate::error::TransportError;
use crate::request::{Method, PlayRequest};

pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &PlayRequest,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// [`Transport`] over a shared `reqwest::Client`.
///
/// Maps timeouts and refused connections to their own variants, 429 to
/// [`TransportError::RateLimited`] (with `Retry-After` seconds when sent),
/// 404 to [`TransportError::NotFound`] and every other non-2xx status to
/// [`TransportError::Status`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the client cannot be constructed
    /// (e.g. invalid TLS configuration).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    /// # Errors
    ///
    /// See [`HttpTransport::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        Self::new(config.request_timeout_secs, &config.user_agent)
    }

    /// Wraps an already-configured client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &PlayRequest) -> Result<String, TransportError> {
        let url = request.url.clone();
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url).form(&request.form),
        };
        let response = builder
            .send()
            .await
            .map_err(|e| classify(e, &url))?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(TransportError::RateLimited {
                url,
                retry_after_secs,
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound { url });
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url,
            });
        }

        tracing::debug!(url = %url, status = status.as_u16(), "fetched page");
        response.text().await.map_err(|e| classify(e, &url))
    }
}

fn classify(err: reqwest::Error, url: &str) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_owned(),
        }
    } else if err.is_connect() {
        TransportError::Connect {
            url: url.to_owned(),
            reason: err.to_string(),
        }
    } else {
        TransportError::Http(err)
    }
}
