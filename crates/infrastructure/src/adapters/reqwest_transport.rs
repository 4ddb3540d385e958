//! HTTP transport implementation using reqwest.
//!
//! The engine is synchronous, so this adapter owns a current-thread tokio
//! runtime and blocks on each request. A client is built per request because
//! TLS verification, proxy and timeout come with the request.

use std::time::{Duration, Instant};

use apiflow_application::ports::{HttpTransport, TransportError};
use apiflow_domain::{
    HttpMethod, HttpRequest, HttpResponse, RequestBody, StringMap, TransportOptions,
};
use reqwest::{Client, Method};
use tokio::runtime::{Builder, Runtime};
use url::Url;

const USER_AGENT: &str = concat!("apiflow/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP transport backed by `reqwest`.
pub struct ReqwestTransport {
    runtime: Runtime,
    default_timeout: Duration,
}

impl ReqwestTransport {
    /// Default overall request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a transport with its own runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be started.
    pub fn new() -> Result<Self, TransportError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Other(format!("failed to start runtime: {e}")))?;
        Ok(Self {
            runtime,
            default_timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Sets the timeout used when a request carries none.
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn build_client(options: &TransportOptions) -> Result<Client, TransportError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(options.accept_invalid_certs);

        if let Some(settings) = &options.proxy {
            let mut proxy = reqwest::Proxy::all(settings.url())
                .map_err(|e| TransportError::InvalidProxy(e.to_string()))?;
            if let Some(username) = &settings.username {
                proxy = proxy.basic_auth(username, settings.password.as_deref().unwrap_or_default());
            }
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))
    }

    /// Parses the endpoint and appends the query parameters.
    fn build_url(request: &HttpRequest) -> Result<Url, TransportError> {
        let mut url = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", request.url)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    /// Encodes the body; form bodies also get a content type unless one is set.
    fn build_body(
        builder: reqwest::RequestBuilder,
        request: &HttpRequest,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        match &request.body {
            RequestBody::None => Ok(builder),
            RequestBody::Raw(text) => Ok(builder.body(text.clone())),
            RequestBody::Form(fields) => {
                let encoded = serde_urlencoded::to_string(fields)
                    .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
                let builder = if request.header("content-type").is_none() {
                    builder.header("Content-Type", FORM_CONTENT_TYPE)
                } else {
                    builder
                };
                Ok(builder.body(encoded))
            }
        }
    }

    /// Maps reqwest errors to transport errors.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        TransportError::Other(error.to_string())
    }

    async fn dispatch(
        client: Client,
        request: &HttpRequest,
        url: Url,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let start = Instant::now();

        let mut builder = client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = Self::build_body(builder, request)?;

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers: StringMap = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?;

        Ok(HttpResponse::new(status, headers, &body, start.elapsed()))
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: &HttpRequest,
        options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError> {
        let url = Self::build_url(request)?;
        let client = Self::build_client(options)?;
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        self.runtime
            .block_on(Self::dispatch(client, request, url, timeout))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use apiflow_domain::ProxySettings;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Post), Method::POST);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Patch), Method::PATCH);
        assert_eq!(ReqwestTransport::to_reqwest_method(HttpMethod::Options), Method::OPTIONS);
    }

    #[test]
    fn test_build_url_appends_query() {
        let mut request = HttpRequest::new(HttpMethod::Get, "https://api.test/items?sort=asc");
        request.query.insert("page".to_string(), "2".to_string());
        request.query.insert("q".to_string(), "a b&c".to_string());
        let url = ReqwestTransport::build_url(&request).unwrap();
        assert_eq!(url.as_str(), "https://api.test/items?sort=asc&page=2&q=a+b%26c");
    }

    #[test]
    fn test_build_url_rejects_garbage() {
        let request = HttpRequest::new(HttpMethod::Get, "not a url");
        assert!(matches!(
            ReqwestTransport::build_url(&request),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_form_body_is_encoded() {
        let mut request = HttpRequest::new(HttpMethod::Post, "https://api.test/login");
        request.body = RequestBody::Form(StringMap::from([
            ("user".to_string(), "ann".to_string()),
            ("pass".to_string(), "p&ss word".to_string()),
        ]));
        let client = Client::new();
        let built = ReqwestTransport::build_body(client.post("https://api.test/login"), &request)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            built.headers().get("content-type").unwrap(),
            FORM_CONTENT_TYPE
        );
        let body = built.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(body, b"user=ann&pass=p%26ss+word");
    }

    #[test]
    fn test_client_with_proxy_and_insecure_tls() {
        let options = TransportOptions {
            accept_invalid_certs: true,
            proxy: Some(ProxySettings::new("proxy.local", 3128).with_auth("bob", "secret")),
            timeout: Some(Duration::from_secs(1)),
        };
        assert!(ReqwestTransport::build_client(&options).is_ok());
    }

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new().unwrap().with_default_timeout(Duration::from_secs(5));
        assert_eq!(transport.default_timeout, Duration::from_secs(5));
    }
}
