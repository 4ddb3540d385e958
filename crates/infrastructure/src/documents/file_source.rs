//! Filesystem document source.
//!
//! Scenario, configuration and step definition documents are YAML; input
//! tables are CSV. Relative paths are resolved against a base directory.

use std::fs;
use std::path::{Path, PathBuf};

use apiflow_application::ports::{DocumentError, DocumentSource, InputTable};
use apiflow_domain::values::deserialize_string_map;
use apiflow_domain::{HttpSpec, ScenarioSpec, StringMap};
use tracing::debug;

/// Reads documents from disk.
#[derive(Debug, Clone)]
pub struct FileDocumentSource {
    base_dir: PathBuf,
}

impl FileDocumentSource {
    /// Creates a source resolving relative paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves `path` against the base directory. Absolute paths are kept.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }
}

impl Default for FileDocumentSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl DocumentSource for FileDocumentSource {
    fn read_text(&self, path: &str) -> Result<String, DocumentError> {
        let full = self.resolve(path);
        debug!(path = %full.display(), "Reading document");
        fs::read_to_string(&full).map_err(|e| DocumentError::unreadable(path, e))
    }

    fn parse_scenario(&self, path: &str, text: &str) -> Result<ScenarioSpec, DocumentError> {
        serde_yaml::from_str(text).map_err(|e| DocumentError::malformed(path, e))
    }

    fn parse_config(&self, path: &str, text: &str) -> Result<StringMap, DocumentError> {
        deserialize_string_map(serde_yaml::Deserializer::from_str(text))
            .map_err(|e| DocumentError::malformed(path, e))
    }

    fn parse_http_spec(&self, path: &str, text: &str) -> Result<HttpSpec, DocumentError> {
        serde_yaml::from_str(text).map_err(|e| DocumentError::malformed(path, e))
    }

    fn parse_table(&self, path: &str, text: &str) -> Result<InputTable, DocumentError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let header = reader
            .headers()
            .map_err(|e| DocumentError::malformed(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = reader
            .records()
            .map(|record| {
                record
                    .map(|record| record.iter().map(str::to_string).collect())
                    .map_err(|e| DocumentError::malformed(path, e))
            })
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        Ok(InputTable { header, rows })
    }
}
