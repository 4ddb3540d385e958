//! Reading values out of an exchange and checking comparisons

use std::fmt;

use apiflow_domain::HttpExchange;
use apiflow_domain::values::stringify;
use serde_json::Value;
use thiserror::Error;

use super::json_path;
use super::parser::{Accessor, BodyFormat, Expression, Operator};
use super::ExpressionError;

/// Side of the exchange that headers and bodies are read from.
///
/// Query parameters, form fields, URL and method always come from the
/// request; the status only exists on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facet {
    /// The request that was sent.
    Request,
    /// The response that came back.
    #[default]
    Response,
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Request => "request",
            Self::Response => "response",
        })
    }
}

/// A failed comparison.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Mismatch {
    /// The value that was read, if any.
    pub actual: Option<String>,
    /// Human readable description.
    pub message: String,
}

impl Expression {
    /// Reads the selected value from `exchange`.
    ///
    /// `Ok(None)` means the value is absent: a missing header or parameter,
    /// a JSON path selecting nothing, or a JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns an error when the scope is unavailable on `facet`, the body
    /// is not JSON, or the JSON path is malformed.
    pub fn extract(
        &self,
        exchange: &HttpExchange,
        facet: Facet,
    ) -> Result<Option<String>, ExpressionError> {
        let request = &exchange.request;
        let response = &exchange.response;

        let value = match (&self.accessor, facet) {
            (Accessor::Status, Facet::Response) => Some(response.status.to_string()),
            (Accessor::Status, Facet::Request) => {
                return Err(ExpressionError::ScopeUnavailable {
                    scope: self.accessor.scope(),
                    facet,
                });
            }
            (Accessor::Header(name), Facet::Response) => response.header(name).map(str::to_string),
            (Accessor::Header(name), Facet::Request) => request.header(name).map(str::to_string),
            (Accessor::Body(format), Facet::Response) => read_body(Some(&response.body), format)?,
            (Accessor::Body(format), Facet::Request) => read_body(request.body.as_text(), format)?,
            (Accessor::QueryParam(key), _) => request.query_param(key).map(str::to_string),
            (Accessor::FormParam(key), _) => request.form_param(key).map(str::to_string),
            (Accessor::Url, _) => Some(request.url.clone()),
            (Accessor::Method, _) => Some(request.method.to_string()),
        };
        Ok(value)
    }

    /// Checks an extracted value against this expression's comparison.
    ///
    /// Without a comparison the value only has to be present.
    ///
    /// # Errors
    ///
    /// Returns a [`Mismatch`] describing the failed check.
    pub fn verify(&self, actual: Option<&str>) -> Result<(), Mismatch> {
        let fail = |message: String| Mismatch {
            actual: actual.map(str::to_string),
            message,
        };

        let Some(comparison) = &self.comparison else {
            return match actual {
                Some(_) => Ok(()),
                None => Err(fail(format!("'{self}': value is missing"))),
            };
        };

        let expected = comparison.expected.as_str();
        let passed = match comparison.operator {
            Operator::Equals => actual == Some(expected),
            Operator::NotEquals => actual != Some(expected),
            Operator::Contains => actual.is_some_and(|value| value.contains(expected)),
        };
        if passed {
            return Ok(());
        }

        let shown = actual.map_or_else(|| "<missing>".to_string(), |value| format!("'{value}'"));
        let message = match comparison.operator {
            Operator::Equals => format!("'{self}': expected '{expected}', got {shown}"),
            Operator::NotEquals => format!("'{self}': expected anything but '{expected}'"),
            Operator::Contains => format!("'{self}': {shown} does not contain '{expected}'"),
        };
        Err(fail(message))
    }
}

fn read_body(body: Option<&str>, format: &BodyFormat) -> Result<Option<String>, ExpressionError> {
    let Some(body) = body else {
        return Ok(None);
    };
    match format {
        BodyFormat::Raw => Ok(Some(body.to_string())),
        BodyFormat::Json(path) => {
            let json: Value = serde_json::from_str(body)
                .map_err(|e| ExpressionError::InvalidJsonBody(e.to_string()))?;
            Ok(json_path::query(&json, path)?
                .filter(|value| !value.is_null())
                .map(stringify))
        }
    }
}
