//! `${key}` placeholder scanning
//!
//! Finds placeholders with their positions so they can be substituted in a
//! single pass.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// A placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The trimmed key between `${` and `}`.
    pub key: String,
    /// Byte range of the whole `${...}` in the template.
    pub span: Range<usize>,
}

/// Finds every placeholder in `input`, in order of appearance.
///
/// Keys that are blank after trimming are ignored.
///
/// # Examples
///
/// ```
/// use apiflow_application::context::find_placeholders;
///
/// let found = find_placeholders("${base}/users/${ id }");
/// assert_eq!(found.len(), 2);
/// assert_eq!(found[1].key, "id");
/// assert_eq!(found[1].span, 14..21);
/// ```
#[must_use]
pub fn find_placeholders(input: &str) -> Vec<Placeholder> {
    PLACEHOLDER
        .captures_iter(input)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let key = captures.get(1)?.as_str().trim();
            (!key.is_empty()).then(|| Placeholder {
                key: key.to_string(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Returns true if `input` contains at least one placeholder.
#[must_use]
pub fn has_placeholders(input: &str) -> bool {
    !find_placeholders(input).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finds_keys_and_spans() {
        let found = find_placeholders("a ${x} b ${y.response @body json:$.id}");
        assert_eq!(
            found,
            vec![
                Placeholder {
                    key: "x".to_string(),
                    span: 2..6,
                },
                Placeholder {
                    key: "y.response @body json:$.id".to_string(),
                    span: 9..38,
                },
            ]
        );
    }

    #[test]
    fn test_ignores_incomplete_and_blank() {
        assert!(find_placeholders("${unclosed").is_empty());
        assert!(find_placeholders("${  }").is_empty());
        assert!(find_placeholders("{{braces}} $plain").is_empty());
    }

    #[test]
    fn test_has_placeholders() {
        assert!(has_placeholders("${$uuid}"));
        assert!(!has_placeholders("no templates"));
    }
}
