//! HTTP transport: one configured `reqwest::Client` per application.

mod http;

pub use http::{HttpRequest, HttpResponse, HttpTransport, TransportError, DEFAULT_TIMEOUT};
