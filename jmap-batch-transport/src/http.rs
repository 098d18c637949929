use crate::{HttpMethod, HttpTransport, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::{debug, trace};

/// [`HttpTransport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl ReqwestTransport {
    /// Transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { http_client })
    }

    /// Wrap an already configured client (auth headers, proxies, ...).
    pub fn with_client(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

fn request_error(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_builder() {
        TransportError::InvalidUrl(url.to_string())
    } else {
        TransportError::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        url: &str,
        method: HttpMethod,
        body: Bytes,
    ) -> Result<Bytes, TransportError> {
        debug!("{} {} ({} bytes)", method, url, body.len());
        trace!("Request body: {}", String::from_utf8_lossy(&body));

        let request = match method {
            HttpMethod::Get => self.http_client.get(url),
            HttpMethod::Post => self
                .http_client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body),
        };

        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| request_error(url, e))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        trace!("Response body: {}", String::from_utf8_lossy(&bytes));
        Ok(bytes)
    }
}
