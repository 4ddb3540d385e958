//! Expression parser

use std::fmt;
use std::str::FromStr;

use super::ExpressionError;

/// Comparison operators, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `[==]`
    Equals,
    /// `[!=]`
    NotEquals,
    /// `[<>]`, the actual value contains the expected one.
    Contains,
}

impl Operator {
    /// All operators; earlier entries win when several match.
    pub const ALL: [Self; 3] = [Self::Equals, Self::NotEquals, Self::Contains];

    /// The literal token.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equals => "[==]",
            Self::NotEquals => "[!=]",
            Self::Contains => "[<>]",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How a body is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyFormat {
    /// The whole body text.
    Raw,
    /// The string form of the value selected by a JSON path.
    Json(String),
}

/// Which facet of the exchange an expression reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// Response status code.
    Status,
    /// A header, by name.
    Header(String),
    /// The body.
    Body(BodyFormat),
    /// A request query parameter, by name.
    QueryParam(String),
    /// A request form field, by name.
    FormParam(String),
    /// The request URL.
    Url,
    /// The request method.
    Method,
}

impl Accessor {
    /// The `@scope` token of this accessor.
    #[must_use]
    pub const fn scope(&self) -> &'static str {
        match self {
            Self::Status => "@status",
            Self::Header(_) => "@header",
            Self::Body(_) => "@body",
            Self::QueryParam(_) => "@queryParam",
            Self::FormParam(_) => "@formParam",
            Self::Url => "@url",
            Self::Method => "@method",
        }
    }
}

/// Operator and expected value of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// The operator.
    pub operator: Operator,
    /// The expected value, verbatim.
    pub expected: String,
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// What to read.
    pub accessor: Accessor,
    /// Optional comparison. Without one, assertions only require a value.
    pub comparison: Option<Comparison>,
    source: String,
}

impl Expression {
    /// The text this expression was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ExpressionError::Empty);
        }

        let (scope, rest) = text
            .find(char::is_whitespace)
            .map_or((text, ""), |at| text.split_at(at));
        let keyed = matches!(scope, "@header" | "@queryParam" | "@formParam" | "@body");
        if !keyed && !matches!(scope, "@status" | "@url" | "@method") {
            return Err(ExpressionError::UnknownScope(scope.to_string()));
        }

        let (subject, comparison) = split_comparison(rest, keyed);
        let accessor = accessor(scope, subject.trim())?;

        Ok(Self {
            accessor,
            comparison,
            source: text.to_string(),
        })
    }
}

/// Separates the subject from an optional operator and expected value.
///
/// `rest` is everything after the scope token, leading whitespace included.
fn split_comparison(rest: &str, keyed: bool) -> (&str, Option<Comparison>) {
    // Operator right after the scope: `@header [<>] Name value`.
    let head = rest.trim_start();
    for operator in Operator::ALL {
        let Some(after) = head.strip_prefix(operator.token()) else {
            continue;
        };
        let Some(operands) = strip_separator(after) else {
            continue;
        };
        let (subject, expected) = if keyed {
            operands
                .find(char::is_whitespace)
                .map_or((operands, ""), |at| (&operands[..at], &operands[at + 1..]))
        } else {
            ("", operands)
        };
        return (
            subject,
            Some(Comparison {
                operator,
                expected: expected.to_string(),
            }),
        );
    }

    // Operator between subject and value: `@header Name [<>] value`.
    for operator in Operator::ALL {
        let separator = format!(" {} ", operator.token());
        if let Some((subject, expected)) = rest.split_once(&separator) {
            return (
                subject,
                Some(Comparison {
                    operator,
                    expected: expected.to_string(),
                }),
            );
        }
    }

    (rest, None)
}

/// Strips the single separator that must follow a prefix operator.
/// An operator at the very end has an empty expected value.
fn strip_separator(after: &str) -> Option<&str> {
    if after.is_empty() {
        return Some("");
    }
    let mut chars = after.chars();
    match chars.next() {
        Some(ch) if ch.is_whitespace() => Some(chars.as_str()),
        _ => None,
    }
}

fn accessor(scope: &str, subject: &str) -> Result<Accessor, ExpressionError> {
    let key = |name: &'static str| {
        if subject.is_empty() {
            Err(ExpressionError::MissingKey(name))
        } else {
            Ok(subject.to_string())
        }
    };
    let bare = |name: &'static str, accessor: Accessor| {
        if subject.is_empty() {
            Ok(accessor)
        } else {
            Err(ExpressionError::UnexpectedArgument {
                scope: name,
                argument: subject.to_string(),
            })
        }
    };

    match scope {
        "@status" => bare("@status", Accessor::Status),
        "@url" => bare("@url", Accessor::Url),
        "@method" => bare("@method", Accessor::Method),
        "@header" => key("@header").map(Accessor::Header),
        "@queryParam" => key("@queryParam").map(Accessor::QueryParam),
        "@formParam" => key("@formParam").map(Accessor::FormParam),
        "@body" => body_format(subject).map(Accessor::Body),
        other => Err(ExpressionError::UnknownScope(other.to_string())),
    }
}

fn body_format(subject: &str) -> Result<BodyFormat, ExpressionError> {
    if subject == "raw" {
        return Ok(BodyFormat::Raw);
    }
    if let Some(path) = subject.strip_prefix("json:") {
        let path = path.trim();
        if path.is_empty() {
            return Err(ExpressionError::MissingKey("@body json:"));
        }
        return Ok(BodyFormat::Json(path.to_string()));
    }
    if subject.starts_with("xml:") || subject == "xml" {
        return Err(ExpressionError::UnsupportedBodyFormat("xml".to_string()));
    }
    Err(ExpressionError::MissingBodyFormat(subject.to_string()))
}
