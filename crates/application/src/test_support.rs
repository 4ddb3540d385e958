//! In-memory port implementations for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use apiflow_domain::{HttpRequest, HttpResponse, HttpSpec, ScenarioSpec, StringMap, TransportOptions};

use crate::ports::{DocumentError, DocumentSource, HttpTransport, InputTable, TransportError};

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// Transport answering from a closure and remembering every request.
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with a JSON body.
    pub fn json(status: u16, body: &'static str) -> Self {
        Self::new(move |_| Ok(json_response(status, body)))
    }

    pub fn failing(error: TransportError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for MockTransport {
    fn send(
        &self,
        request: &HttpRequest,
        _options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    let headers = StringMap::from([(
        "Content-Type".to_string(),
        "application/json; charset=utf-8".to_string(),
    )]);
    HttpResponse::new(status, headers, body.as_bytes(), Duration::from_millis(5))
}

/// Documents kept in a map; YAML decoded with `serde_yaml`, tables split on commas.
#[derive(Default)]
pub struct MemoryDocuments {
    files: HashMap<String, String>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, text: &str) -> Self {
        self.files.insert(path.to_string(), text.to_string());
        self
    }
}

impl DocumentSource for MemoryDocuments {
    fn read_text(&self, path: &str) -> Result<String, DocumentError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| DocumentError::unreadable(path, "not found"))
    }

    fn parse_scenario(&self, path: &str, text: &str) -> Result<ScenarioSpec, DocumentError> {
        serde_yaml::from_str(text).map_err(|e| DocumentError::malformed(path, e))
    }

    fn parse_config(&self, path: &str, text: &str) -> Result<StringMap, DocumentError> {
        let values: HashMap<String, serde_yaml::Value> =
            serde_yaml::from_str(text).map_err(|e| DocumentError::malformed(path, e))?;
        Ok(values
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_yaml::Value::String(text) => text,
                    other => serde_yaml::to_string(&other).unwrap().trim().to_string(),
                };
                (key, value)
            })
            .collect())
    }

    fn parse_http_spec(&self, path: &str, text: &str) -> Result<HttpSpec, DocumentError> {
        serde_yaml::from_str(text).map_err(|e| DocumentError::malformed(path, e))
    }

    fn parse_table(&self, _path: &str, text: &str) -> Result<InputTable, DocumentError> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let split = |line: &str| -> Vec<String> { line.split(',').map(|cell| cell.trim().to_string()).collect() };
        let header = lines.next().map(split).unwrap_or_default();
        let rows = lines.map(split).collect();
        Ok(InputTable { header, rows })
    }
}
