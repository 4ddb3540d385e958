//! Dynamic value provider port

/// Supplies generated values (random data, timestamps) for special keys.
///
/// The provider is consulted before any other variable source. Keys it
/// does not recognise must return `None` so resolution can fall through.
pub trait DynamicValueProvider: Send + Sync {
    /// Returns a value for `key`, or `None` if the key is not one of ours.
    fn lookup(&self, key: &str) -> Option<String>;
}
