pub mod transport;
#[cfg(feature = "http")]
pub mod http;

pub use transport::{HttpMethod, HttpTransport, TransportError};
#[cfg(feature = "http")]
pub use http::ReqwestTransport;
