//! Response type recorded by HTTP steps

use std::time::Duration;

use crate::values::StringMap;

/// What the transport returned for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers. Repeated headers keep the last value.
    pub headers: StringMap,
    /// Response body as text.
    pub body: String,
    /// Time between dispatch and the full body being read.
    pub elapsed: Duration,
}

impl HttpResponse {
    /// Creates a new response from raw parts.
    ///
    /// Invalid UTF-8 in the body is replaced rather than rejected.
    #[must_use]
    pub fn new(status: u16, headers: StringMap, body: &[u8], elapsed: Duration) -> Self {
        Self {
            status,
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
            elapsed,
        }
    }

    /// Looks up a header, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Elapsed time in whole milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_lookup_ignores_case() {
        let headers = StringMap::from([(
            "content-type".to_string(),
            "application/json; charset=utf-8".to_string(),
        )]);
        let response = HttpResponse::new(200, headers, b"{}", Duration::from_millis(12));
        assert_eq!(
            response.header("Content-Type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(response.header("X-Missing"), None);
        assert!(response.is_success());
        assert_eq!(response.elapsed_ms(), 12);
    }

    #[test]
    fn test_lossy_body() {
        let response = HttpResponse::new(500, StringMap::new(), &[0x66, 0xff, 0x6f], Duration::ZERO);
        assert_eq!(response.body, "f\u{fffd}o");
        assert!(!response.is_success());
    }
}
