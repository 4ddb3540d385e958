//! HTTP request definitions and resolved requests

mod method;
mod spec;

pub use method::HttpMethod;
pub use spec::{HttpRequest, HttpSpec, RequestBody};
