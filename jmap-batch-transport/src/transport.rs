use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid URL {0}")]
    InvalidUrl(String),
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("HTTP error {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performs one HTTP exchange: request bytes out, response bytes in.
///
/// Implementations fail with [`TransportError::Status`] on a non-success
/// status and never retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, url: &str, method: HttpMethod, body: Bytes)
        -> Result<Bytes, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn send(
        &self,
        url: &str,
        method: HttpMethod,
        body: Bytes,
    ) -> Result<Bytes, TransportError> {
        (**self).send(url, method, body).await
    }
}
