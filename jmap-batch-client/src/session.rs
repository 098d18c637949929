// The session resource served at /.well-known/jmap

use crate::error::ClientError;
use jmap_batch_core::Capability;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

pub const WELL_KNOWN_PATH: &str = "/.well-known/jmap";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Endpoint batched requests are POSTed to; may be relative to the base URL.
    pub api_url: String,
    /// Account to act on, per capability.
    pub primary_accounts: HashMap<Capability, String>,
    #[serde(default)]
    pub capabilities: HashMap<Capability, Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl Session {
    pub fn from_slice(body: &[u8]) -> Result<Self, ClientError> {
        serde_json::from_slice(body).map_err(ClientError::Session)
    }

    pub fn primary_account(&self, capability: &Capability) -> Option<&str> {
        self.primary_accounts.get(capability).map(String::as_str)
    }

    /// The server's `maxCallsInRequest`, if advertised.
    pub fn max_calls_in_request(&self) -> Option<usize> {
        self.capabilities
            .get(&Capability::CORE)?
            .get("maxCallsInRequest")?
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
    }

    /// `api_url` resolved as a URL reference against `base_url`.
    pub fn resolve_api_url(&self, base_url: &str) -> Result<String, ClientError> {
        let resolved = parse_url(base_url)?
            .join(&self.api_url)
            .map_err(|source| ClientError::InvalidUrl {
                url: self.api_url.clone(),
                source,
            })?;
        Ok(resolved.into())
    }
}

/// URL of the session resource on the host of `base_url`.
pub fn well_known_url(base_url: &str) -> Result<String, ClientError> {
    let url = parse_url(base_url)?
        .join(WELL_KNOWN_PATH)
        .map_err(|source| ClientError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
    Ok(url.into())
}

fn parse_url(url: &str) -> Result<Url, ClientError> {
    Url::parse(url).map_err(|source| ClientError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}
