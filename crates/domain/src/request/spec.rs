//! HTTP step definitions and the requests built from them

use serde::{Deserialize, Serialize};

use super::HttpMethod;
use crate::error::{DomainError, DomainResult};
use crate::values::{StringMap, deserialize_string_map};

/// Template for one HTTP step, as written in its definition document.
///
/// Every string field may contain `${...}` placeholders. Assertions and
/// captures map a name to an expression such as `@status [==] 200`; their
/// declaration order is the evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSpec {
    /// HTTP method name.
    #[serde(default)]
    pub method: String,
    /// Target URL.
    #[serde(default)]
    pub endpoint: String,
    /// Query parameters appended to the endpoint.
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub query_params: StringMap,
    /// Request headers.
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub headers: StringMap,
    /// Raw request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
    /// URL-encoded form body.
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub form_body: StringMap,
    /// Assertion name to assertion expression.
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub asserts: StringMap,
    /// Capture name to capture expression.
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub captures: StringMap,
}

impl HttpSpec {
    /// Returns a copy with every templated field passed through `resolve`.
    ///
    /// Map keys are kept as written; only values are resolved.
    #[must_use]
    pub fn resolve_with(&self, mut resolve: impl FnMut(&str) -> String) -> Self {
        let mut map = |source: &StringMap| -> StringMap {
            source
                .iter()
                .map(|(key, value)| (key.clone(), resolve(value)))
                .collect()
        };
        let query_params = map(&self.query_params);
        let headers = map(&self.headers);
        let form_body = map(&self.form_body);
        let asserts = map(&self.asserts);
        let captures = map(&self.captures);

        Self {
            method: resolve(&self.method),
            endpoint: resolve(&self.endpoint),
            query_params,
            headers,
            raw_body: self.raw_body.as_deref().map(&mut resolve),
            form_body,
            asserts,
            captures,
        }
    }

    /// Builds the request described by this (already resolved) definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is unknown, the endpoint is empty, or
    /// both a raw body and a form body are declared.
    pub fn to_request(&self) -> DomainResult<HttpRequest> {
        let method = self.method.parse::<HttpMethod>()?;
        if self.endpoint.trim().is_empty() {
            return Err(DomainError::invalid_value("endpoint", "must not be empty"));
        }
        let body = match (&self.raw_body, self.form_body.is_empty()) {
            (Some(_), false) => {
                return Err(DomainError::invalid_value(
                    "formBody",
                    "cannot be combined with rawBody",
                ));
            }
            (Some(raw), true) => RequestBody::Raw(raw.clone()),
            (None, false) => RequestBody::Form(self.form_body.clone()),
            (None, true) => RequestBody::None,
        };

        Ok(HttpRequest {
            method,
            url: self.endpoint.trim().to_string(),
            query: self.query_params.clone(),
            headers: self.headers.clone(),
            body,
        })
    }
}

/// Body of a resolved request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// Raw text sent as-is.
    Raw(String),
    /// Form fields sent URL-encoded.
    Form(StringMap),
}

impl RequestBody {
    /// Returns the raw text of the body, if it is a raw body.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::None | Self::Form(_) => None,
        }
    }

    /// Returns the form fields, if it is a form body.
    #[must_use]
    pub const fn form(&self) -> Option<&StringMap> {
        match self {
            Self::Form(fields) => Some(fields),
            Self::None | Self::Raw(_) => None,
        }
    }
}

/// A fully resolved request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Endpoint URL without the query parameters below.
    pub url: String,
    /// Query parameters.
    pub query: StringMap,
    /// Request headers.
    pub headers: StringMap,
    /// Request body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// Creates a request without parameters, headers or body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: StringMap::new(),
            headers: StringMap::new(),
            body: RequestBody::None,
        }
    }

    /// Looks up a request header, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Looks up a query parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Looks up a form field.
    #[must_use]
    pub fn form_param(&self, key: &str) -> Option<&str> {
        self.body
            .form()
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
    }
}
