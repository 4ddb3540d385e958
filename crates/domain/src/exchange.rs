//! A recorded request/response pair.

use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// The resolved request an HTTP step sent and the response it got back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpExchange {
    /// The request as sent.
    pub request: HttpRequest,
    /// The response as received.
    pub response: HttpResponse,
}

impl HttpExchange {
    /// Pairs a request with its response.
    #[must_use]
    pub const fn new(request: HttpRequest, response: HttpResponse) -> Self {
        Self { request, response }
    }
}
