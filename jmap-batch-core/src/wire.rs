// JMAP request / response envelopes as they travel over HTTP.
//
// Method calls and responses are 3-element JSON arrays; they go through a
// tuple representation so the Rust side can keep named fields.

use crate::error::ProtocolMismatchError;
use crate::ids::{Capability, CorrelationId};
use bytes::Bytes;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters of a method call after result references have been rewritten.
pub type Arguments = IndexMap<String, Value>;

/// Prefix marking a parameter whose value comes from another call's result.
pub const REFERENCE_PREFIX: char = '#';

/// Wire form of a result reference: `{"resultOf": .., "name": .., "path": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackReference {
    pub result_of: CorrelationId,
    pub name: String,
    pub path: String,
}

/// `[name, arguments, id]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(String, Arguments, CorrelationId)",
    into = "(String, Arguments, CorrelationId)"
)]
pub struct MethodCall {
    pub name: String,
    pub arguments: Arguments,
    pub id: CorrelationId,
}

impl From<(String, Arguments, CorrelationId)> for MethodCall {
    fn from((name, arguments, id): (String, Arguments, CorrelationId)) -> Self {
        MethodCall { name, arguments, id }
    }
}

impl From<MethodCall> for (String, Arguments, CorrelationId) {
    fn from(call: MethodCall) -> Self {
        (call.name, call.arguments, call.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub using: Vec<Capability>,
    pub method_calls: Vec<MethodCall>,
}

impl Request {
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

/// `[name, payload, id]`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResponse {
    pub name: String,
    pub payload: Value,
    pub id: CorrelationId,
}

/// Name a server uses for a per-call failure in place of the method name.
pub const ERROR_RESPONSE: &str = "error";

/// A per-call error object, e.g. `{"type": "unknownMethod"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodError {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MethodResponse {
    /// The error object, when the server reported this call as failed.
    pub fn error(&self) -> Option<MethodError> {
        if self.name != ERROR_RESPONSE {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }

    pub fn is_error(&self) -> bool {
        self.name == ERROR_RESPONSE
    }

    fn parse(index: usize, raw: Value) -> Result<Self, ProtocolMismatchError> {
        let malformed = |reason: &str| ProtocolMismatchError::MalformedTriple {
            index,
            reason: reason.to_string(),
        };

        let Value::Array(items) = raw else {
            return Err(malformed("expected a [name, payload, id] array"));
        };
        let [name, payload, id]: [Value; 3] = items.try_into().map_err(|items: Vec<Value>| {
            malformed(&format!("expected 3 elements, got {}", items.len()))
        })?;

        let Value::String(name) = name else {
            return Err(malformed("method name is not a string"));
        };
        let Value::String(id) = id else {
            return Err(malformed("correlation id is not a string"));
        };

        Ok(MethodResponse {
            name,
            payload,
            id: CorrelationId::from(id),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub method_responses: Vec<MethodResponse>,
    pub session_state: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    method_responses: Vec<Value>,
    #[serde(default)]
    session_state: Option<String>,
}

impl Response {
    /// Parse a response body, checking every method response triple.
    pub fn from_slice(body: &[u8]) -> Result<Self, ProtocolMismatchError> {
        let raw: RawResponse = serde_json::from_slice(body)
            .map_err(|e| ProtocolMismatchError::MalformedBody(e.to_string()))?;

        let method_responses = raw
            .method_responses
            .into_iter()
            .enumerate()
            .map(|(index, triple)| MethodResponse::parse(index, triple))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Response {
            method_responses,
            session_state: raw.session_state,
        })
    }
}
