use crate::demux::ResponseDecoder;
use crate::error::{BatchError, ConstructionError};
use crate::ids::Capability;
use crate::invocation::Invocation;
use crate::linearize::Linearizer;
use crate::wire::Request;
use indexmap::IndexSet;
use tracing::debug;

/// Builds one request payload out of a batch of invocations.
#[derive(Debug, Clone)]
pub struct RequestAssembler {
    using: Vec<Capability>,
    max_calls_in_request: Option<usize>,
}

/// A request ready to send, paired with the decoder for its response.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub request: Request,
    pub decoder: ResponseDecoder,
}

impl RequestAssembler {
    /// Assembler declaring `using` in every request, plus whatever the
    /// invocations themselves require.
    pub fn new(using: Vec<Capability>) -> Self {
        Self {
            using,
            max_calls_in_request: None,
        }
    }

    /// Reject batches that linearize to more than `limit` method calls.
    pub fn with_max_calls(mut self, limit: usize) -> Self {
        self.max_calls_in_request = Some(limit);
        self
    }

    pub fn max_calls_in_request(&self) -> Option<usize> {
        self.max_calls_in_request
    }

    /// Linearize `roots`, build the request and bind a decoder to `roots`.
    ///
    /// The decoder yields one result per entry of `roots`, in that order,
    /// whatever order the calls end up in on the wire.
    pub fn assemble(&self, roots: &[Invocation]) -> Result<Assembled, BatchError> {
        let (order, method_calls) = Linearizer::linearize_with_order(roots)?;

        if let Some(limit) = self.max_calls_in_request {
            if method_calls.len() > limit {
                return Err(ConstructionError::TooManyCalls {
                    count: method_calls.len(),
                    limit,
                }
                .into());
            }
        }

        let mut using: IndexSet<Capability> = self.using.iter().cloned().collect();
        using.extend(order.iter().filter_map(|inv| inv.capability()).cloned());

        debug!(
            "Assembled request: {} requested, {} method calls, using {:?}",
            roots.len(),
            method_calls.len(),
            using
        );

        Ok(Assembled {
            request: Request {
                using: using.into_iter().collect(),
                method_calls,
            },
            decoder: ResponseDecoder::new(roots),
        })
    }
}

impl Default for RequestAssembler {
    fn default() -> Self {
        Self::new(vec![Capability::CORE])
    }
}
