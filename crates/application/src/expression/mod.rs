//! Assertion and capture expressions
//!
//! An expression selects one facet of a recorded HTTP exchange and may
//! compare it with an expected value:
//!
//! ```text
//! @scope [subject] [operator expected]
//! @scope operator subject expected
//! ```
//!
//! | scope         | subject                          | reads from             |
//! |---------------|----------------------------------|------------------------|
//! | `@status`     | none                             | response               |
//! | `@header`     | header name                      | response (or request)  |
//! | `@body`       | `raw` or `json:<path>`           | response (or request)  |
//! | `@queryParam` | parameter name                   | request                |
//! | `@formParam`  | form field name                  | request                |
//! | `@url`        | none                             | request                |
//! | `@method`     | none                             | request                |
//!
//! Operators are the literal tokens `[==]` (equals), `[!=]` (not equals)
//! and `[<>]` (contains), separated from their operands by spaces. In the
//! infix form the first operator of that list found in the text splits it;
//! an expected value that itself contains an operator token is ambiguous and
//! is split at that first match without further interpretation.
//!
//! # Example
//!
//! ```
//! use apiflow_application::expression::{Accessor, Expression, Operator};
//!
//! let expr: Expression = "@header Content-Type [<>] json".parse().unwrap();
//! assert_eq!(expr.accessor, Accessor::Header("Content-Type".to_string()));
//! assert_eq!(expr.comparison.unwrap().operator, Operator::Contains);
//! ```

mod eval;
pub mod json_path;
mod parser;

use thiserror::Error;

pub use eval::{Facet, Mismatch};
pub use parser::{Accessor, BodyFormat, Comparison, Expression, Operator};

/// Errors raised while parsing or evaluating an expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExpressionError {
    /// The expression text is blank.
    #[error("expression is empty")]
    Empty,

    /// The expression does not start with a known `@scope`.
    #[error("unknown expression scope '{0}'")]
    UnknownScope(String),

    /// A keyed scope was used without a key.
    #[error("'{0}' requires a key")]
    MissingKey(&'static str),

    /// A scope without a subject was given one.
    #[error("'{scope}' takes no argument, found '{argument}'")]
    UnexpectedArgument {
        /// The scope.
        scope: &'static str,
        /// The extra text.
        argument: String,
    },

    /// `@body` without `raw` or `json:`.
    #[error("'@body' requires a subtype ('raw' or 'json:<path>'), found '{0}'")]
    MissingBodyFormat(String),

    /// A declared but unsupported body subtype.
    #[error("body subtype '{0}' is not supported")]
    UnsupportedBodyFormat(String),

    /// The scope cannot be read from the selected side of the exchange.
    #[error("'{scope}' is not available on the {facet}")]
    ScopeUnavailable {
        /// The scope.
        scope: &'static str,
        /// `request` or `response`.
        facet: Facet,
    },

    /// The body is not JSON.
    #[error("body is not valid JSON: {0}")]
    InvalidJsonBody(String),

    /// The JSON path is malformed.
    #[error("invalid JSON path '{path}': {reason}")]
    InvalidJsonPath {
        /// The path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}
