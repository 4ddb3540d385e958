//! Document sources.

mod file_source;

pub use file_source::FileDocumentSource;
