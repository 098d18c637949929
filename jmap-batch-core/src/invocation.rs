use crate::ids::{Capability, CorrelationId};
use crate::wire::MethodCall;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::ops::Div;
use std::sync::Arc;

/// Ordered parameter map of an invocation.
pub type Params = IndexMap<String, ParamValue>;

/// A parameter value: either known now, or taken from another call's result.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Literal(Value),
    Reference(ResultReference),
}

impl ParamValue {
    pub fn as_reference(&self) -> Option<&ResultReference> {
        match self {
            ParamValue::Reference(reference) => Some(reference),
            ParamValue::Literal(_) => None,
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Literal(value)
    }
}

impl From<ResultReference> for ParamValue {
    fn from(reference: ResultReference) -> Self {
        ParamValue::Reference(reference)
    }
}

impl From<&ResultReference> for ParamValue {
    fn from(reference: &ResultReference) -> Self {
        ParamValue::Reference(reference.clone())
    }
}

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_from!(&str, String, bool, i32, i64, u32, u64, f64);

/// One method call destined for a batched request.
///
/// Cloning is cheap and yields a handle to the same call, so one invocation
/// can be listed as a root and referenced by others at the same time.
#[derive(Clone)]
pub struct Invocation {
    inner: Arc<InvocationInner>,
}

struct InvocationInner {
    method_name: String,
    id: CorrelationId,
    params: Params,
    capability: Option<Capability>,
}

impl Invocation {
    /// Create an invocation with a freshly generated correlation id.
    pub fn new(method_name: impl Into<String>, params: Params) -> Self {
        Self::with_id(method_name, CorrelationId::generate(), params)
    }

    /// Create an invocation with a caller-chosen correlation id.
    pub fn with_id(method_name: impl Into<String>, id: CorrelationId, params: Params) -> Self {
        Self::build(method_name.into(), id, params, None)
    }

    /// Create an invocation that needs `capability` declared in `using`.
    pub fn with_capability(
        method_name: impl Into<String>,
        capability: Capability,
        params: Params,
    ) -> Self {
        Self::build(
            method_name.into(),
            CorrelationId::generate(),
            params,
            Some(capability),
        )
    }

    fn build(
        method_name: String,
        id: CorrelationId,
        params: Params,
        capability: Option<Capability>,
    ) -> Self {
        Self {
            inner: Arc::new(InvocationInner {
                method_name,
                id,
                params,
                capability,
            }),
        }
    }

    pub fn method_name(&self) -> &str {
        &self.inner.method_name
    }

    pub fn id(&self) -> &CorrelationId {
        &self.inner.id
    }

    pub fn params(&self) -> &Params {
        &self.inner.params
    }

    pub fn capability(&self) -> Option<&Capability> {
        self.inner.capability.as_ref()
    }

    /// Reference the fragment at `path` of this call's future result.
    pub fn result(&self, path: impl Into<String>) -> ResultReference {
        ResultReference {
            producer: Producer::Handle(self.clone()),
            path: path.into(),
        }
    }

    /// Result references among the parameters, in parameter order.
    pub fn references(&self) -> impl Iterator<Item = (&str, &ResultReference)> {
        self.inner
            .params
            .iter()
            .filter_map(|(key, value)| value.as_reference().map(|r| (key.as_str(), r)))
    }

    /// True when both handles point at the same call.
    pub fn ptr_eq(&self, other: &Invocation) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// An already rewritten call; back-references stay literal `#key` arguments.
impl From<MethodCall> for Invocation {
    fn from(call: MethodCall) -> Self {
        let params = call
            .arguments
            .into_iter()
            .map(|(key, value)| (key, ParamValue::Literal(value)))
            .collect();
        Invocation::with_id(call.name, call.id, params)
    }
}

impl PartialEq for Invocation {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.inner.method_name == other.inner.method_name
                && self.inner.id == other.inner.id
                && self.inner.params == other.inner.params)
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Producers are printed by id and path only.
        let params: Vec<(&str, String)> = self
            .inner
            .params
            .iter()
            .map(|(key, value)| {
                let shown = match value {
                    ParamValue::Literal(literal) => literal.to_string(),
                    ParamValue::Reference(reference) => {
                        format!("<{}{}>", reference.source_id(), reference.path)
                    }
                };
                (key.as_str(), shown)
            })
            .collect();

        f.debug_struct("Invocation")
            .field("method_name", &self.inner.method_name)
            .field("id", &self.inner.id)
            .field("params", &params)
            .finish()
    }
}

/// A pointer into the not-yet-computed result of another invocation.
///
/// Usually built from a handle (`invocation.result(..)` or `&invocation / ".."`),
/// which also pulls the producer into the batch. [`ResultReference::by_id`]
/// names the producer by correlation id only; it must then be part of the
/// batch through some other route.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultReference {
    producer: Producer,
    path: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Producer {
    Handle(Invocation),
    Id(CorrelationId),
}

impl ResultReference {
    pub fn by_id(id: CorrelationId, path: impl Into<String>) -> Self {
        ResultReference {
            producer: Producer::Id(id),
            path: path.into(),
        }
    }

    /// The producing invocation, when the reference holds a handle to it.
    pub fn source(&self) -> Option<&Invocation> {
        match &self.producer {
            Producer::Handle(invocation) => Some(invocation),
            Producer::Id(_) => None,
        }
    }

    pub fn source_id(&self) -> &CorrelationId {
        match &self.producer {
            Producer::Handle(invocation) => invocation.id(),
            Producer::Id(id) => id,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Navigate one segment deeper, e.g. `list` then `*` then `id`.
    pub fn join(&self, segment: &str) -> ResultReference {
        ResultReference {
            producer: self.producer.clone(),
            path: format!("{}/{}", self.path, segment),
        }
    }
}

/// `&invocation / "ids"` references the `/ids` fragment of its result.
impl Div<&str> for &Invocation {
    type Output = ResultReference;

    fn div(self, segment: &str) -> ResultReference {
        self.result(format!("/{}", segment))
    }
}

impl Div<&str> for ResultReference {
    type Output = ResultReference;

    fn div(self, segment: &str) -> ResultReference {
        self.join(segment)
    }
}
