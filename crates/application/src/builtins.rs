//! Built-in dynamic values
//!
//! Keys are prefixed with `$` (`${$uuid}`, `${$randomEmail}`) and produce a
//! fresh value on every lookup.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::ports::DynamicValueProvider;

type Generator = fn() -> String;

const GENERATORS: &[(&str, &str, Generator)] = &[
    ("$uuid", "Random UUID v4", uuid_v4),
    ("$randomUuid", "Random UUID v4", uuid_v4),
    ("$timestamp", "Unix timestamp in seconds", timestamp),
    ("$isoTimestamp", "RFC 3339 timestamp (UTC)", iso_timestamp),
    ("$randomInt", "Random integer 0-1000", random_int),
    ("$randomString", "Random alphanumeric string (16 chars)", random_string),
    ("$randomAlphanumeric", "Random alphanumeric string (8 chars)", random_alphanumeric),
    ("$randomEmail", "Random example.com email address", random_email),
    ("$randomFirstName", "Random first name", random_first_name),
    ("$randomLastName", "Random last name", random_last_name),
    ("$randomBoolean", "Random boolean (true/false)", random_boolean),
    ("$date", "Current date (YYYY-MM-DD)", date),
    ("$dateISO", "Current date at midnight UTC", date_iso),
];

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Emma", "Olivia", "Liam", "Noah", "Ava",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Martinez",
    "Lopez", "Wilson", "Anderson", "Taylor", "Moore", "Lee", "Perez",
];

/// The default [`DynamicValueProvider`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinVariables;

impl BuiltinVariables {
    /// Generates the value for a built-in key, or `None` if the key is unknown.
    #[must_use]
    pub fn resolve(name: &str) -> Option<String> {
        GENERATORS
            .iter()
            .find(|(key, _, _)| *key == name)
            .map(|(_, _, generate)| generate())
    }

    /// Names and descriptions of every built-in key.
    pub fn available() -> impl Iterator<Item = (&'static str, &'static str)> {
        GENERATORS.iter().map(|(key, description, _)| (*key, *description))
    }
}

impl DynamicValueProvider for BuiltinVariables {
    fn lookup(&self, key: &str) -> Option<String> {
        Self::resolve(key)
    }
}

fn uuid_v4() -> String {
    Uuid::new_v4().to_string()
}

fn timestamp() -> String {
    Utc::now().timestamp().to_string()
}

fn iso_timestamp() -> String {
    Utc::now().to_rfc3339()
}

fn random_int() -> String {
    rand::rng().random_range(0..=1000).to_string()
}

fn random_string() -> String {
    alphanumeric(16)
}

fn random_alphanumeric() -> String {
    alphanumeric(8)
}

fn alphanumeric(len: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(CHARSET[rng.random_range(0..CHARSET.len())]))
        .collect()
}

fn random_email() -> String {
    format!("{}@example.com", alphanumeric(8).to_lowercase())
}

fn pick(names: &[&str]) -> String {
    names[rand::rng().random_range(0..names.len())].to_string()
}

fn random_first_name() -> String {
    pick(FIRST_NAMES)
}

fn random_last_name() -> String {
    pick(LAST_NAMES)
}

fn random_boolean() -> String {
    rand::rng().random_bool(0.5).to_string()
}

fn date() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn date_iso() -> String {
    Utc::now().format("%Y-%m-%dT00:00:00Z").to_string()
}
