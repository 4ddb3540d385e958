//! Document source port
//!
//! Reading and decoding of scenario, configuration, step definition and
//! input table documents.

use apiflow_domain::{HttpSpec, ScenarioSpec, StringMap};
use thiserror::Error;

/// Failure to retrieve or decode a document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The document could not be read.
    #[error("unable to read '{path}': {message}")]
    Unreadable {
        /// Document location.
        path: String,
        /// Underlying message.
        message: String,
    },

    /// The document was read but is not well formed.
    #[error("unable to parse '{path}': {message}")]
    Malformed {
        /// Document location.
        path: String,
        /// Underlying message.
        message: String,
    },
}

impl DocumentError {
    /// Creates an `Unreadable` error.
    pub fn unreadable(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Unreadable {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Creates a `Malformed` error.
    pub fn malformed(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// A decoded delimited table: the header line and the data lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputTable {
    /// Column names.
    pub header: Vec<String>,
    /// Data lines, in file order.
    pub rows: Vec<Vec<String>>,
}

/// Port for reading and decoding documents.
///
/// `path` is passed to the decoders only for error messages.
pub trait DocumentSource: Send + Sync {
    /// Reads a document as text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Unreadable`] if the document cannot be read.
    fn read_text(&self, path: &str) -> Result<String, DocumentError>;

    /// Decodes a scenario document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the text is not a scenario.
    fn parse_scenario(&self, path: &str, text: &str) -> Result<ScenarioSpec, DocumentError>;

    /// Decodes a configuration document into flat string values.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the text is not a map.
    fn parse_config(&self, path: &str, text: &str) -> Result<StringMap, DocumentError>;

    /// Decodes an HTTP step definition.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the text is not a definition.
    fn parse_http_spec(&self, path: &str, text: &str) -> Result<HttpSpec, DocumentError>;

    /// Decodes delimited tabular text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] if the text is not a valid table.
    fn parse_table(&self, path: &str, text: &str) -> Result<InputTable, DocumentError>;
}
