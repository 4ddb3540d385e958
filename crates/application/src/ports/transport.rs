//! HTTP transport port

use apiflow_domain::{HttpRequest, HttpResponse, TransportOptions};
use thiserror::Error;

/// Failures reported by the transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The remote end refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The host name could not be resolved.
    #[error("DNS lookup failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying message.
        message: String,
    },

    /// Any other connection level failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The proxy settings could not be applied.
    #[error("invalid proxy: {0}")]
    InvalidProxy(String),

    /// The body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Port for sending HTTP requests.
///
/// Calls block the current thread until the full response body is read.
/// The engine performs no retries; timeouts are the transport's business.
pub trait HttpTransport: Send + Sync {
    /// Sends `request` with the given per-request options.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or the response
    /// could not be read. Non-2xx statuses are responses, not errors.
    fn send(
        &self,
        request: &HttpRequest,
        options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError>;
}
