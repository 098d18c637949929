use jmap_batch_core::{BatchError, Capability};
use jmap_batch_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid session document: {0}")]
    Session(#[source] serde_json::Error),

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("session has no primary account for {0}")]
    MissingAccount(Capability),
}
