//! Request batching for JMAP.
//!
//! Several method calls travel in one HTTP request. A call may consume a
//! fragment of an earlier call's result before that result exists; the
//! [`Linearizer`] orders the calls so producers run first and rewrites such
//! [`ResultReference`]s into wire back-references. The [`RequestAssembler`]
//! builds the request body and a [`ResponseDecoder`] that maps the combined
//! response back onto the caller's invocations.

#[macro_use]
mod macros;

pub mod assemble;
pub mod demux;
pub mod error;
pub mod ids;
pub mod invocation;
pub mod linearize;
pub mod wire;

pub use assemble::{Assembled, RequestAssembler};
pub use demux::ResponseDecoder;
pub use error::{BatchError, ConstructionError, ProtocolMismatchError};
pub use ids::{Capability, CorrelationId};
pub use invocation::{Invocation, ParamValue, Params, ResultReference};
pub use linearize::Linearizer;
pub use wire::{
    Arguments, BackReference, MethodCall, MethodError, MethodResponse, Request, Response,
};
