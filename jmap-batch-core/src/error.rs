use crate::ids::CorrelationId;
use thiserror::Error;

/// Raised while building a batch, before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("correlation id {0} is used by more than one invocation")]
    DuplicateCorrelationId(CorrelationId),

    #[error("result reference to {0}, which is not part of the batch")]
    UnknownReference(CorrelationId),

    #[error("{method} ({id}): parameter {parameter:?} is both a literal and a result reference")]
    ConflictingParameter {
        method: String,
        id: CorrelationId,
        parameter: String,
    },

    #[error("batch holds {count} method calls, server accepts at most {limit}")]
    TooManyCalls { count: usize, limit: usize },
}

/// The response body does not line up with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolMismatchError {
    #[error("no response for {method} ({id})")]
    MissingResult { id: CorrelationId, method: String },

    #[error("method response #{index} is malformed: {reason}")]
    MalformedTriple { index: usize, reason: String },

    #[error("response body is malformed: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("dependency cycle between invocations: {}", format_chain(.chain))]
    Cycle { chain: Vec<CorrelationId> },

    #[error(transparent)]
    ProtocolMismatch(#[from] ProtocolMismatchError),

    #[error("failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_chain(chain: &[CorrelationId]) -> String {
    chain
        .iter()
        .map(CorrelationId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_lists_chain() {
        let err = BatchError::Cycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle between invocations: a -> b -> a"
        );
    }

    #[test]
    fn test_construction_error_is_transparent() {
        let err: BatchError = ConstructionError::TooManyCalls { count: 5, limit: 4 }.into();
        assert_eq!(
            err.to_string(),
            "batch holds 5 method calls, server accepts at most 4"
        );
        assert!(matches!(
            err,
            BatchError::Construction(ConstructionError::TooManyCalls { .. })
        ));
    }

    #[test]
    fn test_missing_result_display() {
        let err = ProtocolMismatchError::MissingResult {
            id: "q1".into(),
            method: "Email/get".to_string(),
        };
        assert_eq!(err.to_string(), "no response for Email/get (q1)");
    }
}
