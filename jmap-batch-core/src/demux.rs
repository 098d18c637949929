use crate::error::{BatchError, ProtocolMismatchError};
use crate::ids::CorrelationId;
use crate::invocation::Invocation;
use crate::wire::{MethodResponse, Response};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{trace, warn};

/// Maps a combined response back onto the invocations the caller asked for.
#[derive(Debug, Clone)]
pub struct ResponseDecoder {
    expected: Vec<Expected>,
}

#[derive(Debug, Clone)]
struct Expected {
    id: CorrelationId,
    method: String,
}

impl ResponseDecoder {
    /// Decoder for `requested`, in the caller's order.
    pub fn new(requested: &[Invocation]) -> Self {
        Self {
            expected: requested
                .iter()
                .map(|inv| Expected {
                    id: inv.id().clone(),
                    method: inv.method_name().to_string(),
                })
                .collect(),
        }
    }

    /// Correlation ids the decoder will look for, in caller order.
    pub fn expected_ids(&self) -> impl Iterator<Item = &CorrelationId> {
        self.expected.iter().map(|e| &e.id)
    }

    /// Result payload of each requested invocation.
    pub fn decode(&self, body: &[u8]) -> Result<Vec<Value>, BatchError> {
        Ok(self
            .decode_responses(body)?
            .into_iter()
            .map(|response| response.payload)
            .collect())
    }

    /// Full method response (name and payload) of each requested invocation.
    ///
    /// A call the server failed comes back as an ordinary response named
    /// `"error"`; see [`MethodResponse::error`].
    pub fn decode_responses(&self, body: &[u8]) -> Result<Vec<MethodResponse>, BatchError> {
        let response = Response::from_slice(body).inspect_err(|e| {
            warn!("Rejecting response body: {}", e);
        })?;
        Ok(self.demultiplex(response)?)
    }

    /// Pick each requested invocation's response out of `response`.
    pub fn demultiplex(
        &self,
        response: Response,
    ) -> Result<Vec<MethodResponse>, ProtocolMismatchError> {
        trace!(
            "Demultiplexing {} method responses for {} requested calls",
            response.method_responses.len(),
            self.expected.len()
        );

        // One call may yield several responses (e.g. Email/copy followed by an
        // implicit Email/set); the first one is the call's own result.
        let mut by_id: HashMap<CorrelationId, MethodResponse> = HashMap::new();
        for method_response in response.method_responses {
            by_id
                .entry(method_response.id.clone())
                .or_insert(method_response);
        }

        self.expected
            .iter()
            .map(|expected| {
                by_id.get(&expected.id).cloned().ok_or_else(|| {
                    warn!(
                        "Response has no result for {} ({})",
                        expected.method, expected.id
                    );
                    ProtocolMismatchError::MissingResult {
                        id: expected.id.clone(),
                        method: expected.method.clone(),
                    }
                })
            })
            .collect()
    }
}
