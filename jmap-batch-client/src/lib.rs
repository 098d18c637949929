pub mod client;
pub mod error;
pub mod logging;
pub mod methods;
pub mod session;

pub use client::{Client, ClientConfig, KindCalls, PreparedRequest};
pub use error::ClientError;
pub use methods::{method_name, Kind, Method};
pub use session::Session;

pub use jmap_batch_core::{params, Invocation, MethodResponse, Params, ResultReference};
