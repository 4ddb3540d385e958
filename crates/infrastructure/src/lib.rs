//! Apiflow Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod documents;
pub mod reporting;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use documents::FileDocumentSource;
pub use reporting::{ConsoleReporter, JsonReporter, ScenarioReport};
pub use serialization::{SerializationError, from_json, to_json_stable};
