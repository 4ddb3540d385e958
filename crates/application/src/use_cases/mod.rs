//! Application use cases (business logic orchestration).

mod load_scenario;

pub use load_scenario::*;
