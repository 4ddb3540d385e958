//! Minimal JSON path queries over response and request bodies.
//!
//! Supported: `$`, `$.field`, `$.a.b`, `$.items[0]`, `$.items[0].id`,
//! `$['odd key']`, and a trailing `[*]` which selects the whole array.

use serde_json::Value;

use super::ExpressionError;

/// Queries `json` with `path`.
///
/// Returns `Ok(None)` when the path is well formed but selects nothing.
///
/// # Errors
///
/// Returns [`ExpressionError::InvalidJsonPath`] for malformed paths.
pub fn query<'a>(json: &'a Value, path: &str) -> Result<Option<&'a Value>, ExpressionError> {
    let invalid = |reason: &str| ExpressionError::InvalidJsonPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let rest = path
        .trim()
        .strip_prefix('$')
        .ok_or_else(|| invalid("must start with '$'"))?;

    let mut current = json;
    for segment in segments(rest).map_err(|reason| invalid(&reason))? {
        let next = match segment {
            Segment::Field(name) => current.get(name.as_str()),
            Segment::Index(index) => current.get(index),
            Segment::Wildcard => match current {
                Value::Array(_) => Some(current),
                _ => None,
            },
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
    Wildcard,
}

fn segments(path: &str) -> Result<Vec<Segment>, String> {
    let mut out = Vec::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '.' || next == '[' {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                if name.is_empty() {
                    return Err("empty field name".to_string());
                }
                out.push(Segment::Field(name));
            }
            '[' => {
                let mut inner = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(next);
                }
                if !closed {
                    return Err("unclosed '['".to_string());
                }
                out.push(bracket(inner.trim())?);
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(out)
}

fn bracket(inner: &str) -> Result<Segment, String> {
    if inner == "*" {
        return Ok(Segment::Wildcard);
    }
    let quoted = inner
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')));
    if let Some(name) = quoted {
        return Ok(Segment::Field(name.to_string()));
    }
    inner
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| format!("invalid array index '{inner}'"))
}
