//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the scenario engine and its external
//! collaborators. Each port is a trait implemented by adapters in the
//! infrastructure layer (or by in-memory fakes in tests).

mod documents;
mod dynamic_values;
mod reporter;
mod transport;

pub use documents::{DocumentError, DocumentSource, InputTable};
pub use dynamic_values::DynamicValueProvider;
pub use reporter::Reporter;
pub use transport::{HttpTransport, TransportError};
