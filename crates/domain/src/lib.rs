//! Apiflow Domain - Core scenario types
//!
//! This crate defines the declarative model the scenario engine consumes:
//! scenarios, steps, input rows, HTTP step definitions, resolved requests and
//! responses, and the merged run configuration.
//! All types here are pure Rust with no I/O dependencies.

pub mod config;
pub mod error;
pub mod exchange;
pub mod request;
pub mod response;
pub mod scenario;
pub mod transport;
pub mod values;

pub use config::{ConfigSource, ReportSpec, RunConfiguration, RunSpec};
pub use error::{DomainError, DomainResult};
pub use exchange::HttpExchange;
pub use request::{HttpMethod, HttpRequest, HttpSpec, RequestBody};
pub use response::HttpResponse;
pub use scenario::{InputRow, Phase, ScenarioSpec, StepKind, StepSpec};
pub use transport::{ProxySettings, TransportOptions};
pub use values::StringMap;
